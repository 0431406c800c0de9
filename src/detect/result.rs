use crate::detect::labels::coco_label;

/// A labeled bounding box in normalized frame coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Top-left corner, 0..1.
    pub x: f32,
    pub y: f32,
    /// Box size, 0..1.
    pub w: f32,
    pub h: f32,
    /// Detection score, already past the configured threshold.
    pub confidence: f32,
    /// Index into the COCO class table.
    pub class_id: usize,
}

impl Detection {
    pub fn label(&self) -> &'static str {
        coco_label(self.class_id)
    }

    /// Convert to a pixel rectangle clipped to the frame: (x, y, w, h).
    /// Width and height are at least 1 so the rect is always drawable,
    /// which makes degenerate (zero-sized) frames collapse to a unit
    /// rect at the origin.
    pub fn to_pixel_rect(&self, frame_width: u32, frame_height: u32) -> (i32, i32, u32, u32) {
        if frame_width == 0 || frame_height == 0 {
            return (0, 0, 1, 1);
        }
        let fw = frame_width as f32;
        let fh = frame_height as f32;

        let x0 = (self.x.clamp(0.0, 1.0) * fw).round();
        let y0 = (self.y.clamp(0.0, 1.0) * fh).round();
        let x1 = ((self.x + self.w).clamp(0.0, 1.0) * fw).round();
        let y1 = ((self.y + self.h).clamp(0.0, 1.0) * fh).round();

        let w = ((x1 - x0) as u32).clamp(1, frame_width);
        let h = ((y1 - y0) as u32).clamp(1, frame_height);
        let x = (x0 as i32).min(frame_width as i32 - w as i32).max(0);
        let y = (y0 as i32).min(frame_height as i32 - h as i32).max(0);
        (x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_rect_scales_normalized_coordinates() {
        let det = Detection {
            x: 0.25,
            y: 0.5,
            w: 0.5,
            h: 0.25,
            confidence: 0.9,
            class_id: 0,
        };
        assert_eq!(det.to_pixel_rect(640, 480), (160, 240, 320, 120));
    }

    #[test]
    fn pixel_rect_clips_out_of_range_boxes() {
        let det = Detection {
            x: -0.1,
            y: 0.9,
            w: 0.3,
            h: 0.5,
            confidence: 0.9,
            class_id: 0,
        };
        let (x, y, w, h) = det.to_pixel_rect(100, 100);
        assert!(x >= 0 && y >= 0);
        assert!(x as u32 + w <= 100);
        assert!(y as u32 + h <= 100);
    }

    #[test]
    fn pixel_rect_handles_zero_sized_frames() {
        let det = Detection {
            x: 0.25,
            y: 0.25,
            w: 0.5,
            h: 0.5,
            confidence: 0.9,
            class_id: 0,
        };
        assert_eq!(det.to_pixel_rect(0, 0), (0, 0, 1, 1));
        assert_eq!(det.to_pixel_rect(640, 0), (0, 0, 1, 1));
        assert_eq!(det.to_pixel_rect(0, 480), (0, 0, 1, 1));
    }

    #[test]
    fn labels_resolve_through_the_coco_table() {
        let det = Detection {
            x: 0.0,
            y: 0.0,
            w: 0.1,
            h: 0.1,
            confidence: 0.5,
            class_id: 0,
        };
        assert_eq!(det.label(), "person");
    }
}
