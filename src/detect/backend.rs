use anyhow::Result;

use crate::detect::result::Detection;

/// Detector backend trait.
///
/// A backend owns its model handle and confidence threshold; the threshold
/// is configured at construction and applied on every `detect` call.
/// Implementations must treat the pixel slice as read-only and ephemeral.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Optional warm-up hook, run once before the first real frame.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }

    /// Run detection on one RGB24 frame.
    ///
    /// Returns the boxes that cleared the confidence threshold, in
    /// normalized frame coordinates.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;
}
