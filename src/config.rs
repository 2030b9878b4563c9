//! Tunables for the gallery scene.
//!
//! Everything the controllers and the scene root treat as a fixed number
//! lives here, grouped by the part of the scene it belongs to.

/// Avatar, follow camera and hand prop
pub mod player {
    use glam::Vec3;

    /// Camera position = avatar position + this offset
    pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 5.0);

    /// Screen-space drag offset (pixels) to velocity (units/s)
    pub const DRAG_SENSITIVITY: f32 = 0.01;

    /// Vertical velocity written on a jump
    pub const JUMP_IMPULSE: f32 = 7.5;

    /// Max ray hit distance below the avatar centre that still counts as grounded
    pub const GROUND_DISTANCE: f32 = 1.75;

    /// Length of the downward ground probe
    pub const GROUND_RAY_LENGTH: f32 = 100.0;

    /// Hand prop distance in front of the camera
    pub const HAND_DISTANCE: f32 = 1.0;

    /// Speed above which the hand joint starts to bob
    pub const BOB_SPEED_THRESHOLD: f32 = 1.0;

    /// Per-tick lerp factor of the hand joint angle
    pub const HAND_SMOOTHING: f32 = 0.1;

    /// Joint angle the hand snaps to when a click hits nothing
    pub const SWING_ANGLE: f32 = -0.5;

    pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 10.0, 0.0);

    /// Capsule half-height (cylinder part) and radius
    pub const CAPSULE_HALF_HEIGHT: f32 = 0.75;
    pub const CAPSULE_RADIUS: f32 = 0.5;

    pub const MASS: f32 = 1.0;
}

/// Rigid-body world
pub mod physics {
    use glam::Vec3;

    pub const GRAVITY: Vec3 = Vec3::new(0.0, -30.0, 0.0);

    /// Half extents of the ground cuboid collider
    pub const GROUND_HALF_EXTENTS: Vec3 = Vec3::new(1000.0, 2.0, 1000.0);

    /// Centre of the ground collider; its top face sits at y = 0
    pub const GROUND_CENTER: Vec3 = Vec3::new(0.0, -2.0, 0.0);

    /// Visual floor plane height and size
    pub const GROUND_PLANE_Y: f32 = 0.5;
    pub const GROUND_PLANE_SIZE: f32 = 1000.0;
    pub const GROUND_COLOR: [f32; 3] = [0.839, 0.682, 0.518];
}

/// Gallery frames and focus
pub mod frames {
    use glam::Vec3;

    pub const GOLDEN_RATIO: f32 = 1.618_034;

    /// Translation of the whole frame group
    pub const GROUP_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.0);

    /// Focus point in the focused frame's local space
    pub const FOCUS_OFFSET: Vec3 = Vec3::new(0.0, GOLDEN_RATIO / 2.0, 1.25);

    /// Focus position when no frame is selected
    pub const OVERVIEW_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.5);

    /// Idle image scale; hovering multiplies x/y by the hover factors
    pub const IMAGE_SCALE: Vec3 = Vec3::new(0.85, 0.9, 1.0);
    pub const HOVER_SCALE_X: f32 = 0.85;
    pub const HOVER_SCALE_Y: f32 = 0.905;

    pub const TINT_IDLE: Vec3 = Vec3::new(1.0, 1.0, 1.0);
    pub const TINT_HOVER: Vec3 = Vec3::new(1.0, 0.647, 0.0);

    /// Smooth time (seconds) for image scale and tint
    pub const DAMP_SMOOTH_TIME: f32 = 0.1;

    /// Smooth time (seconds) for the focus pose consumer
    pub const FOCUS_SMOOTH_TIME: f32 = 0.25;

    pub const OUTER_COLOR: [f32; 3] = [0.85, 0.85, 0.85];

    /// Caption font size, egui points
    pub const CAPTION_SIZE: f32 = 12.0;

    pub const ROUTE_PREFIX: &str = "/item/";
}

/// Projection
pub mod camera {
    pub const FOV_Y_DEGREES: f32 = 90.0;
    pub const Z_NEAR: f32 = 0.1;
    pub const Z_FAR: f32 = 1000.0;
}

/// Sky and lighting
pub mod lighting {
    pub const SUN_POSITION: [f32; 3] = [100.0, 20.0, 100.0];
    pub const SUN_INTENSITY: f32 = 0.8;
    pub const AMBIENT: f32 = 0.3;
    pub const SKY_COLOR: [f64; 3] = [0.53, 0.75, 0.95];
}

/// Native window and web canvas
pub mod window {
    pub const TITLE: &str = "Gallery Walk";
    pub const WIDTH: u32 = 1280;
    pub const HEIGHT: u32 = 720;
}

/// Pointer handling
pub mod pointer {
    /// Max pointer travel (pixels) between press and release for a click
    pub const CLICK_SLOP: f32 = 2.0;

    /// Longest frame step fed to the simulation
    pub const MAX_DT: f32 = 0.1;
}
