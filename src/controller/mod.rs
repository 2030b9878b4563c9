// CONTROLLER: Input, physics, routing and per-frame logic
pub mod frames;
pub mod input;
pub mod physics;
pub mod player;
pub mod router;

pub use frames::{FocusPose, FrameEntity, FrameGroup};
pub use input::{Actions, InputEvent, InputProcessor, InputState, KeyBindings, PointerEvent, PointerHub};
pub use physics::{PhysicsWorld, RayHit, RigidBodyWorld};
pub use player::PlayerController;
pub use router::{Route, Router};
