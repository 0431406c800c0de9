#![cfg(feature = "backend-tract")]

//! YOLO detection backend on tract-onnx.
//!
//! Loads ONNX YOLOv8-family weights from disk and runs them on RGB frames.
//! Frames are letterboxed to the model's square input; the `[1, 4+nc,
//! anchors]` output head is decoded, thresholded, and de-duplicated with
//! greedy IoU NMS before the boxes are mapped back to normalized frame
//! coordinates.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::{imageops, Rgb, RgbImage};
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;

/// Input edge length for YOLOv8 checkpoints.
const DEFAULT_INPUT_SIZE: u32 = 640;
/// Greedy NMS overlap cutoff.
const NMS_IOU_THRESHOLD: f32 = 0.45;
/// Letterbox padding gray, the YOLO training convention.
const PAD_COLOR: Rgb<u8> = Rgb([114, 114, 114]);

pub struct YoloBackend {
    model: TypedRunnableModel<TypedModel>,
    input_size: u32,
    confidence_threshold: f32,
}

impl YoloBackend {
    /// Load ONNX weights from disk and prepare them for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, confidence_threshold: f32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let size = DEFAULT_INPUT_SIZE as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, size, size)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold,
        })
    }

    fn build_input(&self, image: &RgbImage) -> (Tensor, Letterbox) {
        let (boxed, letterbox) = letterbox_image(image, self.input_size);
        let size = self.input_size as usize;
        let input = tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
            boxed.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });
        (input.into_tensor(), letterbox)
    }
}

impl DetectorBackend for YoloBackend {
    fn name(&self) -> &'static str {
        "yolo"
    }

    fn warm_up(&mut self) -> Result<()> {
        let size = self.input_size as usize;
        let input = tract_ndarray::Array4::<f32>::zeros((1, 3, size, size));
        self.model
            .run(tvec!(input.into_tensor().into()))
            .context("model warm-up inference failed")?;
        log::debug!("YoloBackend: model warmed up");
        Ok(())
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected,
                pixels.len()
            ));
        }
        let image = RgbImage::from_raw(width, height, pixels.to_vec())
            .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", width, height))?;

        let (input, letterbox) = self.build_input(&image);
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let shaped = view
            .into_dimensionality::<tract_ndarray::Ix3>()
            .context("model output was not a [batch, channels, anchors] head")?;
        let preds = shaped.index_axis(tract_ndarray::Axis(0), 0);
        // Some exports emit [anchors, 4+nc]; orient to rows = 4+nc.
        let preds = if preds.shape()[0] > preds.shape()[1] {
            preds.reversed_axes()
        } else {
            preds
        };

        let raw = decode_predictions(&preds, self.confidence_threshold);
        let kept = nms(raw, NMS_IOU_THRESHOLD);
        Ok(kept
            .iter()
            .map(|b| letterbox.to_frame_detection(b, width, height))
            .collect())
    }
}

/// Mapping from letterboxed model input back to the source frame.
#[derive(Clone, Copy, Debug)]
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl Letterbox {
    fn to_frame_detection(&self, raw: &RawBox, frame_width: u32, frame_height: u32) -> Detection {
        let fw = frame_width as f32;
        let fh = frame_height as f32;
        let x = ((raw.x1 - self.pad_x) / self.scale / fw).clamp(0.0, 1.0);
        let y = ((raw.y1 - self.pad_y) / self.scale / fh).clamp(0.0, 1.0);
        let w = ((raw.x2 - raw.x1) / self.scale / fw).clamp(0.0, 1.0 - x);
        let h = ((raw.y2 - raw.y1) / self.scale / fh).clamp(0.0, 1.0 - y);
        Detection {
            x,
            y,
            w,
            h,
            confidence: raw.confidence,
            class_id: raw.class_id,
        }
    }
}

/// Resize preserving aspect ratio onto a gray square canvas.
fn letterbox_image(image: &RgbImage, size: u32) -> (RgbImage, Letterbox) {
    let scale =
        (size as f32 / image.width() as f32).min(size as f32 / image.height() as f32);
    let new_w = ((image.width() as f32 * scale) as u32).clamp(1, size);
    let new_h = ((image.height() as f32 * scale) as u32).clamp(1, size);

    let resized = imageops::resize(image, new_w, new_h, imageops::FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(size, size, PAD_COLOR);
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;
    imageops::overlay(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    (
        canvas,
        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
        },
    )
}

/// A decoded box in letterbox pixel space.
#[derive(Clone, Copy, Debug)]
struct RawBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
    class_id: usize,
}

/// Decode a `[4+nc, anchors]` head: rows 0..4 are cx/cy/w/h, the rest are
/// per-class scores. Keeps the best class per anchor when it clears the
/// threshold.
fn decode_predictions(
    preds: &tract_ndarray::ArrayView2<f32>,
    threshold: f32,
) -> Vec<RawBox> {
    let rows = preds.shape()[0];
    let anchors = preds.shape()[1];
    if rows < 5 {
        return Vec::new();
    }

    let mut boxes = Vec::new();
    for col in 0..anchors {
        let mut class_id = 0usize;
        let mut best = f32::NEG_INFINITY;
        for class in 0..(rows - 4) {
            let score = preds[[4 + class, col]];
            if score > best {
                best = score;
                class_id = class;
            }
        }
        if !best.is_finite() || best < threshold {
            continue;
        }

        let cx = preds[[0, col]];
        let cy = preds[[1, col]];
        let w = preds[[2, col]];
        let h = preds[[3, col]];
        boxes.push(RawBox {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            confidence: best,
            class_id,
        });
    }
    boxes
}

fn iou(a: &RawBox, b: &RawBox) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - inter;
    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Greedy NMS: keep the highest-scoring box, drop everything overlapping it
/// past the threshold, repeat.
fn nms(mut boxes: Vec<RawBox>, iou_threshold: f32) -> Vec<RawBox> {
    boxes.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut keep: Vec<RawBox> = Vec::new();
    for candidate in boxes {
        if keep
            .iter()
            .all(|kept| iou(&candidate, kept) <= iou_threshold)
        {
            keep.push(candidate);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn head(rows: usize, cols: usize, values: &[f32]) -> tract_ndarray::Array2<f32> {
        tract_ndarray::Array2::from_shape_vec((rows, cols), values.to_vec()).unwrap()
    }

    #[test]
    fn decode_keeps_best_class_past_threshold() {
        // Two classes, three anchors. Anchor 0 scores 0.9 for class 1,
        // anchor 1 scores 0.1 everywhere, anchor 2 scores 0.6 for class 0.
        #[rustfmt::skip]
        let preds = head(6, 3, &[
            100.0, 300.0, 500.0, // cx
            100.0, 300.0, 500.0, // cy
            40.0, 40.0, 80.0,    // w
            40.0, 40.0, 80.0,    // h
            0.05, 0.1, 0.6,      // class 0
            0.9, 0.1, 0.2,       // class 1
        ]);

        let boxes = decode_predictions(&preds.view(), 0.25);
        assert_eq!(boxes.len(), 2);

        assert_eq!(boxes[0].class_id, 1);
        assert_eq!(boxes[0].confidence, 0.9);
        assert_eq!(boxes[0].x1, 80.0);
        assert_eq!(boxes[0].y2, 120.0);

        assert_eq!(boxes[1].class_id, 0);
        assert_eq!(boxes[1].confidence, 0.6);
    }

    #[test]
    fn decode_with_no_class_rows_is_empty() {
        let preds = head(4, 2, &[1.0; 8]);
        assert!(decode_predictions(&preds.view(), 0.0).is_empty());
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let b = RawBox {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            confidence: 1.0,
            class_id: 0,
        };
        assert!((iou(&b, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn nms_drops_overlapping_lower_confidence_boxes() {
        let make = |x1: f32, confidence: f32| RawBox {
            x1,
            y1: 0.0,
            x2: x1 + 10.0,
            y2: 10.0,
            confidence,
            class_id: 0,
        };
        // First two overlap heavily, third is disjoint.
        let boxes = vec![make(0.0, 0.6), make(1.0, 0.9), make(100.0, 0.5)];

        let kept = nms(boxes, 0.45);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].confidence, 0.5);
    }

    #[test]
    fn letterbox_maps_back_to_normalized_frame_coordinates() {
        // 640x480 frame into a 640x640 input: scale 1.0, 80px top pad.
        let image = RgbImage::new(640, 480);
        let (boxed, letterbox) = letterbox_image(&image, 640);
        assert_eq!(boxed.dimensions(), (640, 640));
        assert_eq!(letterbox.pad_x, 0.0);
        assert_eq!(letterbox.pad_y, 80.0);

        let raw = RawBox {
            x1: 160.0,
            y1: 200.0,
            x2: 480.0,
            y2: 440.0,
            confidence: 0.8,
            class_id: 2,
        };
        let det = letterbox.to_frame_detection(&raw, 640, 480);
        assert!((det.x - 0.25).abs() < 1e-6);
        assert!((det.y - 0.25).abs() < 1e-6);
        assert!((det.w - 0.5).abs() < 1e-6);
        assert!((det.h - 0.5).abs() < 1e-6);
        assert_eq!(det.class_id, 2);
    }

    #[test]
    fn loading_a_missing_model_fails() {
        let err = YoloBackend::new("/nonexistent/yolov8n.onnx", 0.25);
        assert!(err.is_err());
    }

    #[test]
    fn loading_junk_weights_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not an onnx graph").unwrap();
        assert!(YoloBackend::new(file.path(), 0.25).is_err());
    }
}
