//! RGB frame container.
//!
//! `Frame` is the unit of work flowing through the pipeline: produced by a
//! video source, read by the detector, copied once by the overlay, shown by
//! the display. It is never retained across loop iterations.

use anyhow::{anyhow, Result};
use image::RgbImage;

/// One captured image, tightly packed RGB24.
///
/// The length invariant `data.len() == width * height * 3` is checked at
/// construction, so downstream consumers can index without re-validating.
#[derive(Clone)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Wrap an RGB24 buffer, validating its length against the dimensions.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions {}x{} overflow", width, height))?;
        if data.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch for {}x{}: expected {}, got {}",
                width,
                height,
                expected,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB24 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Copy this frame into an `RgbImage` for drawing or resizing.
    pub fn to_rgb_image(&self) -> RgbImage {
        // The length invariant makes from_raw infallible here.
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }

    /// Take ownership of an `RgbImage` produced by the overlay.
    pub fn from_rgb_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_validates_buffer_length() {
        assert!(Frame::new(vec![0u8; 12], 2, 2).is_ok());
        assert!(Frame::new(vec![0u8; 11], 2, 2).is_err());
        assert!(Frame::new(vec![0u8; 13], 2, 2).is_err());
    }

    #[test]
    fn frame_round_trips_through_rgb_image() {
        let data: Vec<u8> = (0..27).collect();
        let frame = Frame::new(data.clone(), 3, 3).unwrap();
        let image = frame.to_rgb_image();
        let back = Frame::from_rgb_image(image);
        assert_eq!(back.width(), 3);
        assert_eq!(back.height(), 3);
        assert_eq!(back.pixels(), data.as_slice());
    }
}
