//! Live object-detection preview for USB cameras.
//!
//! One linear pipeline: a [`source::VideoSource`] produces RGB frames, a
//! [`detect::DetectorBackend`] turns each frame into labeled bounding boxes,
//! [`overlay::annotate`] draws the boxes and a measured frame rate onto a
//! copy of the frame, and a [`display::Display`] shows the result and polls
//! for the quit key. [`pipeline::run`] wires the three seams together.
//!
//! The seams are traits so the loop can be driven by fakes in tests and by
//! feature-gated hardware backends in production:
//!
//! - `capture-v4l2`: V4L2 device capture (USB cameras)
//! - `backend-tract`: ONNX YOLO inference via tract
//! - `display-opencv`: preview window via OpenCV highgui
//!
//! Without any of these the crate still runs end to end on the synthetic
//! source, the stub motion detector, and the headless display.

pub mod detect;
pub mod display;
pub mod fps;
pub mod frame;
pub mod overlay;
pub mod pipeline;
pub mod source;

#[cfg(feature = "backend-tract")]
pub use detect::YoloBackend;
pub use detect::{Detection, DetectorBackend, StubBackend};
#[cfg(feature = "display-opencv")]
pub use display::OpencvDisplay;
pub use display::{Display, HeadlessDisplay};
pub use fps::FpsCounter;
pub use frame::Frame;
pub use pipeline::{PipelineStats, StopReason};
pub use source::{CameraConfig, CameraSource, SyntheticSource, VideoSource};

/// Default capture width requested from the camera.
pub const DEFAULT_FRAME_WIDTH: u32 = 640;

/// Default capture height requested from the camera.
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;
