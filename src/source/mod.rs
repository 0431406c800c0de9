//! Video frame sources.
//!
//! A source owns an open capture handle for the lifetime of the run and
//! yields RGB frames one at a time:
//!
//! - `SyntheticSource`: deterministic test scene, no hardware needed
//! - `V4l2Source`: local V4L2 devices (feature: capture-v4l2)
//! - `CameraSource`: dispatch wrapper the binary opens from a device path
//!
//! `next_frame` returning `Ok(None)` means the stream ended; `Err` means the
//! device failed. Either way the pipeline stops and the handle is released
//! when the source drops.

mod camera;
mod synthetic;
#[cfg(feature = "capture-v4l2")]
mod v4l2;

pub use camera::{CameraConfig, CameraSource};
pub use synthetic::SyntheticSource;
#[cfg(feature = "capture-v4l2")]
pub use v4l2::V4l2Source;

use anyhow::Result;

use crate::frame::Frame;

/// Capture statistics for periodic health logging.
#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub device: String,
}

/// An open capture handle the pipeline reads frames from.
pub trait VideoSource {
    /// Open the underlying device. Must be called before `next_frame`.
    fn connect(&mut self) -> Result<()>;

    /// Capture the next frame. `Ok(None)` signals end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// False once the device stops delivering frames in time.
    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> SourceStats;
}
