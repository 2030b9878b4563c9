use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::player::{BOB_SPEED_THRESHOLD, HAND_DISTANCE, HAND_SMOOTHING, SWING_ANGLE};
use crate::utils::{lerp, step_above};

/// Tool held in front of the camera. The group follows the camera rigidly;
/// the child joint bobs while the avatar moves.
#[derive(Debug, Clone)]
pub struct HandRig {
    pub position: Vec3,
    pub rotation: Quat,
    /// Local x-rotation of the child joint
    pub joint_angle: f32,
}

impl Default for HandRig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            joint_angle: 0.0,
        }
    }
}

impl HandRig {
    /// Joint angle the bob oscillates around this tick
    pub fn bob_target(speed: f32, elapsed: f32) -> f32 {
        (step_above(speed, BOB_SPEED_THRESHOLD) * elapsed * 10.0).sin() / 6.0
    }

    /// Recompute the rig from the camera pose and the avatar speed
    pub fn follow(&mut self, eye: Vec3, forward: Vec3, rotation: Quat, speed: f32, elapsed: f32) {
        self.joint_angle = lerp(self.joint_angle, Self::bob_target(speed, elapsed), HAND_SMOOTHING);
        self.rotation = rotation;
        self.position = eye + forward * HAND_DISTANCE;
    }

    /// Snap the joint into a swing; the bob smoothing eases it back
    pub fn swing(&mut self) {
        self.joint_angle = SWING_ANGLE;
    }

    pub fn group_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Child joint then the tool's rest pose, relative to the group
    pub fn tool_transform(&self) -> Mat4 {
        let joint = Mat4::from_rotation_x(self.joint_angle);
        let rest = Mat4::from_scale_rotation_translation(
            Vec3::splat(0.5),
            Quat::from_euler(EulerRot::XYZ, 0.0, std::f32::consts::PI / 1.8, -0.3),
            Vec3::ZERO,
        );
        self.group_transform() * joint * rest
    }
}
