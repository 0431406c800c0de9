//! Synthetic camera scene.
//!
//! Generates a flat background with a bright square sweeping across it, so
//! every downstream stage (motion detection, overlay, display) has real
//! work to do without camera hardware. Deterministic frame to frame.

use anyhow::Result;

use super::{CameraConfig, SourceStats, VideoSource};
use crate::frame::Frame;

const BACKGROUND: [u8; 3] = [32, 32, 32];
const SQUARE: [u8; 3] = [230, 230, 80];

pub struct SyntheticSource {
    config: CameraConfig,
    frame_count: u64,
}

impl SyntheticSource {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frame_count: 0,
        }
    }

    fn render_scene(&self) -> Vec<u8> {
        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let mut pixels = vec![0u8; width * height * 3];
        for chunk in pixels.chunks_exact_mut(3) {
            chunk.copy_from_slice(&BACKGROUND);
        }

        // Square side is a quarter of the frame height, sweeping left to
        // right and wrapping, 4 pixels per frame.
        let side = (height / 4).max(1);
        let top = height / 2 - side / 2;
        let span = width + side;
        let left = (self.frame_count as usize * 4) % span;

        for row in top..(top + side).min(height) {
            for col in left.saturating_sub(side)..left.min(width) {
                let offset = (row * width + col) * 3;
                pixels[offset..offset + 3].copy_from_slice(&SQUARE);
            }
        }
        pixels
    }
}

impl VideoSource for SyntheticSource {
    fn connect(&mut self) -> Result<()> {
        log::info!(
            "SyntheticSource: connected to {} ({}x{})",
            self.config.device,
            self.config.width,
            self.config.height
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(limit) = self.config.max_frames {
            if self.frame_count >= limit {
                return Ok(None);
            }
        }
        let pixels = self.render_scene();
        self.frame_count += 1;
        Frame::new(pixels, self.config.width, self.config.height).map(Some)
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            device: self.config.device.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench_config() -> CameraConfig {
        CameraConfig {
            device: "stub://bench".to_string(),
            width: 64,
            height: 48,
            max_frames: None,
            ..CameraConfig::default()
        }
    }

    #[test]
    fn frames_match_configured_dimensions() -> Result<()> {
        let mut source = SyntheticSource::new(bench_config());
        source.connect()?;

        let frame = source.next_frame()?.expect("frame");
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.pixels().len(), 64 * 48 * 3);
        Ok(())
    }

    #[test]
    fn scene_moves_between_frames() -> Result<()> {
        let mut source = SyntheticSource::new(bench_config());
        source.connect()?;

        let first = source.next_frame()?.expect("frame");
        let second = source.next_frame()?.expect("frame");
        assert_ne!(first.pixels(), second.pixels());
        Ok(())
    }

    #[test]
    fn frame_limit_ends_the_stream() -> Result<()> {
        let mut config = bench_config();
        config.max_frames = Some(2);
        let mut source = SyntheticSource::new(config);
        source.connect()?;

        assert!(source.next_frame()?.is_some());
        assert!(source.next_frame()?.is_some());
        assert!(source.next_frame()?.is_none());
        assert_eq!(source.stats().frames_captured, 2);
        Ok(())
    }
}
