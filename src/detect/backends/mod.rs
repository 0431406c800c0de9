pub mod stub;

#[cfg(feature = "backend-tract")]
pub mod yolo;

pub use stub::StubBackend;

#[cfg(feature = "backend-tract")]
pub use yolo::YoloBackend;
