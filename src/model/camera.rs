use glam::{Mat4, Quat, Vec2, Vec3};

use crate::config;

pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    /// Camera at the origin looking down -Z
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::ZERO,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: config::camera::FOV_Y_DEGREES.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: config::camera::Z_NEAR,
            z_far: config::camera::Z_FAR,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-1.5533, 1.5533); // Slightly less than π/2 to avoid gimbal lock
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    /// Orientation that maps local -Z onto `forward()`
    pub fn rotation(&self) -> Quat {
        let cp = self.pitch.clamp(-1.5533, 1.5533);
        Quat::from_rotation_y(-(self.yaw + std::f32::consts::FRAC_PI_2)) * Quat::from_rotation_x(cp)
    }

    pub fn target(&self) -> Vec3 { self.eye + self.forward() }

    pub fn set_aspect(&mut self, width: u32, height: u32) { self.aspect = width as f32 / height.max(1) as f32; }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target(), self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }

    /// World-space ray through a pixel of a `width` x `height` viewport.
    /// Returns (origin on the near plane, unit direction).
    pub fn screen_ray(&self, x: f32, y: f32, width: f32, height: f32) -> (Vec3, Vec3) {
        let ndc_x = 2.0 * x / width.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height.max(1.0);
        let inv = self.view_proj().inverse();
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        (near, (far - near).normalize_or_zero())
    }

    /// Pixel position of a world point, or None when it is behind the camera
    pub fn project(&self, point: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let clip = self.view_proj() * point.extend(1.0);
        if clip.w <= 1e-5 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = Camera::new(800, 600);
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(cam.rotation().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_rotation_matches_forward() {
        let mut cam = Camera::new(800, 600);
        for (yaw, pitch) in [(0.0, 0.0), (0.7, 0.3), (-2.1, -0.9), (3.0, 1.2)] {
            cam.yaw = yaw;
            cam.pitch = pitch;
            assert!((cam.rotation() * Vec3::NEG_Z).abs_diff_eq(cam.forward(), 1e-5));
        }
    }

    #[test]
    fn test_center_ray_follows_forward() {
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::new(1.0, 2.0, 3.0);
        let (origin, dir) = cam.screen_ray(400.0, 300.0, 800.0, 600.0);
        assert!(dir.abs_diff_eq(cam.forward(), 1e-4));
        assert!(origin.distance(cam.eye) < cam.z_near * 2.0);
    }

    #[test]
    fn test_project_inverts_screen_ray() {
        let cam = Camera::new(800, 600);
        let (origin, dir) = cam.screen_ray(120.0, 80.0, 800.0, 600.0);
        let p = cam.project(origin + dir * 10.0, 800.0, 600.0).unwrap();
        assert!(p.abs_diff_eq(Vec2::new(120.0, 80.0), 0.1));
    }

    #[test]
    fn test_point_behind_is_not_projected() {
        let cam = Camera::new(800, 600);
        assert!(cam.project(Vec3::new(0.0, 0.0, 5.0), 800.0, 600.0).is_none());
    }
}
