//! Camera source selection.
//!
//! `CameraSource` picks a backend from the configured device path:
//! `stub://` paths get the synthetic scene generator, anything else is
//! treated as a V4L2 device node and requires the `capture-v4l2` feature.

use anyhow::Result;
#[cfg(not(feature = "capture-v4l2"))]
use anyhow::anyhow;

use super::synthetic::SyntheticSource;
#[cfg(feature = "capture-v4l2")]
use super::v4l2::V4l2Source;
use super::{SourceStats, VideoSource};
use crate::frame::Frame;
use crate::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};

/// Configuration shared by all camera backends.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Device path (e.g., "/dev/video0") or "stub://" scene name.
    pub device: String,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
    /// Target frame rate requested from the device.
    pub target_fps: u32,
    /// Stop after this many frames (synthetic backend only).
    pub max_frames: Option<u64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            target_fps: 30,
            max_frames: None,
        }
    }
}

impl CameraConfig {
    /// Config for a numbered local camera (`/dev/video<index>`).
    pub fn for_index(index: u32) -> Self {
        Self {
            device: format!("/dev/video{}", index),
            ..Self::default()
        }
    }
}

/// Camera frame source.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticSource),
    #[cfg(feature = "capture-v4l2")]
    Device(V4l2Source),
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if config.device.starts_with("stub://") {
            return Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticSource::new(config)),
            });
        }
        #[cfg(feature = "capture-v4l2")]
        {
            Ok(Self {
                backend: CameraBackend::Device(V4l2Source::new(config)?),
            })
        }
        #[cfg(not(feature = "capture-v4l2"))]
        {
            Err(anyhow!(
                "opening {} requires the capture-v4l2 feature",
                config.device
            ))
        }
    }
}

impl VideoSource for CameraSource {
    fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            #[cfg(feature = "capture-v4l2")]
            CameraBackend::Device(source) => source.connect(),
        }
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "capture-v4l2")]
            CameraBackend::Device(source) => source.next_frame(),
        }
    }

    fn is_healthy(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_healthy(),
            #[cfg(feature = "capture-v4l2")]
            CameraBackend::Device(source) => source.is_healthy(),
        }
    }

    fn stats(&self) -> SourceStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            #[cfg(feature = "capture-v4l2")]
            CameraBackend::Device(source) => source.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_device_selects_synthetic_backend() -> Result<()> {
        let config = CameraConfig {
            device: "stub://bench".to_string(),
            ..CameraConfig::default()
        };
        let mut source = CameraSource::new(config)?;
        source.connect()?;
        assert!(source.next_frame()?.is_some());
        Ok(())
    }

    #[test]
    fn index_config_builds_device_path() {
        let config = CameraConfig::for_index(2);
        assert_eq!(config.device, "/dev/video2");
        assert_eq!(config.width, DEFAULT_FRAME_WIDTH);
        assert_eq!(config.height, DEFAULT_FRAME_HEIGHT);
    }

    #[cfg(not(feature = "capture-v4l2"))]
    #[test]
    fn device_path_without_feature_is_an_error() {
        let config = CameraConfig::for_index(0);
        assert!(CameraSource::new(config).is_err());
    }
}
