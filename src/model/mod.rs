// MODEL: Gallery data and per-object state
pub mod camera;
pub mod frame;
pub mod hand;

pub use camera::Camera;
pub use frame::{FrameDescriptor, FrameId, FrameVisual};
pub use hand::HandRig;
