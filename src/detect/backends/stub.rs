use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;

/// Score reported for the synthetic box while the scene is changing.
const MOTION_CONFIDENCE: f32 = 0.85;

/// Stub backend for runs without model weights. Hashes each frame and
/// reports a centered box whenever consecutive frames differ.
pub struct StubBackend {
    confidence_threshold: f32,
    last_hash: Option<[u8; 32]>,
}

impl StubBackend {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            last_hash: None,
        }
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>> {
        let current_hash: [u8; 32] = Sha256::digest(pixels).into();

        let motion = self.last_hash.is_some_and(|prev| prev != current_hash);
        self.last_hash = Some(current_hash);

        if motion && MOTION_CONFIDENCE >= self.confidence_threshold {
            Ok(vec![Detection {
                x: 0.25,
                y: 0.25,
                w: 0.5,
                h: 0.5,
                confidence: MOTION_CONFIDENCE,
                class_id: 0,
            }])
        } else {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_motion_between_differing_frames() -> Result<()> {
        let mut backend = StubBackend::new(0.25);

        assert!(backend.detect(b"frame1", 10, 10)?.is_empty());

        let hits = backend.detect(b"frame2", 10, 10)?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].confidence, MOTION_CONFIDENCE);

        assert!(backend.detect(b"frame2", 10, 10)?.is_empty());
        Ok(())
    }

    #[test]
    fn threshold_above_motion_score_suppresses_boxes() -> Result<()> {
        let mut backend = StubBackend::new(0.9);

        backend.detect(b"frame1", 10, 10)?;
        assert!(backend.detect(b"frame2", 10, 10)?.is_empty());
        Ok(())
    }
}
