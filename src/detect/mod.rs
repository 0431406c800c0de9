mod backend;
mod backends;
mod labels;
mod result;

pub use backend::DetectorBackend;
#[cfg(feature = "backend-tract")]
pub use backends::YoloBackend;
pub use backends::StubBackend;
pub use labels::{coco_label, COCO_CLASS_COUNT};
pub use result::Detection;
