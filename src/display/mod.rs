//! Display surfaces.
//!
//! The pipeline talks to a `Display` for both output (show the annotated
//! frame) and input (poll for the quit key):
//!
//! - `OpencvDisplay`: highgui preview window (feature: display-opencv)
//! - `HeadlessDisplay`: no window; quit arrives via a ctrl-c flag

mod headless;
#[cfg(feature = "display-opencv")]
mod opencv;

pub use headless::HeadlessDisplay;
#[cfg(feature = "display-opencv")]
pub use opencv::OpencvDisplay;

use std::time::Duration;

use anyhow::Result;

use crate::frame::Frame;

pub trait Display {
    /// Show one annotated frame.
    fn show(&mut self, frame: &Frame) -> Result<()>;

    /// Wait up to `timeout` for a key press.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<char>>;

    /// Tear down any window. Idempotent; runs on every exit path.
    fn close(&mut self) -> Result<()>;
}
