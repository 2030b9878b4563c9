use std::fmt;

use glam::{EulerRot, Mat4, Quat, Vec3};
use sha2::{Digest, Sha256};

use crate::config::frames::{
    DAMP_SMOOTH_TIME, GOLDEN_RATIO, HOVER_SCALE_X, HOVER_SCALE_Y, IMAGE_SCALE, TINT_HOVER, TINT_IDLE,
};
use crate::utils::damp3;

/// Stable identifier of a frame, derived from its image reference.
///
/// Formatted as a name-based UUID (version 5 layout, SHA-256 digest) so it
/// can be used directly as a route segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(String);

impl FrameId {
    pub fn from_url(url: &str) -> Self {
        let digest = Sha256::digest(url.as_bytes());
        let mut b = [0u8; 16];
        b.copy_from_slice(&digest[..16]);
        b[6] = (b[6] & 0x0f) | 0x50;
        b[8] = (b[8] & 0x3f) | 0x80;

        let hex: String = b.iter().map(|byte| format!("{byte:02x}")).collect();
        Self(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stand-in colour for the photo, taken from the first id bytes
    pub fn swatch(&self) -> [f32; 3] {
        let byte = |i: usize| u8::from_str_radix(&self.0[i * 2..i * 2 + 2], 16).unwrap_or(0x80);
        [byte(0), byte(1), byte(2)].map(|b| 0.25 + 0.6 * b as f32 / 255.0)
    }

    /// Caption shown next to the frame
    pub fn caption(&self) -> String {
        self.0.split('-').collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static placement of one photo in the gallery
#[derive(Debug, Clone)]
pub struct FrameDescriptor {
    pub position: Vec3,
    /// Euler angles (XYZ order), radians
    pub rotation: Vec3,
    pub url: String,
}

impl FrameDescriptor {
    pub fn new(position: [f32; 3], rotation: [f32; 3], url: String) -> Self {
        Self { position: position.into(), rotation: rotation.into(), url }
    }

    /// Transform of the frame group relative to the gallery root
    pub fn local_transform(&self) -> Mat4 {
        let r = self.rotation;
        Mat4::from_rotation_translation(Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z), self.position)
    }
}

pub fn pexel(id: u32) -> String {
    format!(
        "https://images.pexels.com/photos/{id}/pexels-photo-{id}.jpeg?auto=compress&cs=tinysrgb&dpr=2&h=750&w=1260"
    )
}

/// The six frames: three along the left wall, three along the right
pub fn gallery() -> Vec<FrameDescriptor> {
    use std::f32::consts::PI;
    let left = [0.0, PI / 2.5, 0.0];
    let right = [0.0, -PI / 2.5, 0.0];
    vec![
        FrameDescriptor::new([-1.75, 0.0, 0.25], left, pexel(327482)),
        FrameDescriptor::new([-2.0, 0.0, 1.5], left, pexel(325185)),
        FrameDescriptor::new([-2.25, 0.0, 2.75], left, pexel(358574)),
        FrameDescriptor::new([1.75, 0.0, 0.25], right, pexel(227675)),
        FrameDescriptor::new([2.25, 0.0, 1.5], right, pexel(911738)),
        FrameDescriptor::new([2.5, 0.0, 2.75], right, pexel(173886)),
    ]
}

/// Clickable outer box, relative to the frame group
pub fn outer_box_transform() -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(1.0, GOLDEN_RATIO, 0.05),
        Quat::IDENTITY,
        Vec3::new(0.0, GOLDEN_RATIO / 2.0, 0.0),
    )
}

/// Inner tinted box, relative to the outer box
pub fn inner_box_transform() -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(0.9, 0.93, 0.9),
        Quat::IDENTITY,
        Vec3::new(0.0, 0.0, 0.2),
    )
}

/// Photo quad with the animated scale, relative to the outer box
pub fn image_transform(scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, Vec3::new(0.0, 0.0, 0.7))
}

/// Caption anchor, relative to the frame group
pub fn caption_anchor() -> Vec3 {
    Vec3::new(0.55, GOLDEN_RATIO, 0.0)
}

/// Per-frame animated state: hover, zoom, image scale and tint
#[derive(Debug, Clone)]
pub struct FrameVisual {
    pub hovered: bool,
    /// Fixed at creation, desynchronises the zoom across frames
    pub phase: f32,
    pub zoom: f32,
    pub image_scale: Vec3,
    pub tint: Vec3,
}

impl FrameVisual {
    pub fn new(phase: f32) -> Self {
        Self {
            hovered: false,
            phase,
            zoom: 2.0,
            image_scale: Vec3::ONE,
            tint: TINT_IDLE,
        }
    }

    pub fn random() -> Self {
        Self::new(rand::random::<f32>())
    }

    pub fn scale_target(&self, active: bool) -> Vec3 {
        let shrink = self.hovered && !active;
        Vec3::new(
            IMAGE_SCALE.x * if shrink { HOVER_SCALE_X } else { 1.0 },
            IMAGE_SCALE.y * if shrink { HOVER_SCALE_Y } else { 1.0 },
            IMAGE_SCALE.z,
        )
    }

    pub fn tint_target(&self) -> Vec3 {
        if self.hovered { TINT_HOVER } else { TINT_IDLE }
    }

    /// Advance zoom, scale and tint by one frame
    pub fn animate(&mut self, active: bool, elapsed: f32, dt: f32) {
        self.zoom = 2.0 + (self.phase * 10000.0 + elapsed / 3.0).sin() / 2.0;
        self.image_scale = damp3(self.image_scale, self.scale_target(active), DAMP_SMOOTH_TIME, dt);
        self.tint = damp3(self.tint, self.tint_target(), DAMP_SMOOTH_TIME, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_stable() {
        let url = pexel(327482);
        assert_eq!(FrameId::from_url(&url), FrameId::from_url(&url));
        assert_eq!(FrameId::from_url(&url), FrameId::from_url(&pexel(327482)));
    }

    #[test]
    fn test_id_shape() {
        let id = FrameId::from_url("https://example.com/a.jpg");
        let parts: Vec<_> = id.as_str().split('-').collect();
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![8, 4, 4, 4, 12]);
        assert!(parts[2].starts_with('5'));
        assert!(id.as_str().chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
        assert!(!id.as_str().chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_gallery_ids_are_distinct() {
        let mut ids: Vec<_> = gallery().iter().map(|d| FrameId::from_url(&d.url)).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_caption_replaces_dashes() {
        let id = FrameId::from_url(&pexel(911738));
        let caption = id.caption();
        assert!(!caption.contains('-'));
        assert_eq!(caption.split(' ').count(), 5);
    }

    #[test]
    fn test_swatch_is_deterministic_and_mid_tone() {
        let id = FrameId::from_url(&pexel(173886));
        assert_eq!(id.swatch(), FrameId::from_url(&pexel(173886)).swatch());
        assert!(id.swatch().iter().all(|c| (0.2..=0.9).contains(c)));
    }

    #[test]
    fn test_hover_shrinks_image_unless_active() {
        let mut v = FrameVisual::new(0.5);
        v.hovered = true;
        assert!(v.scale_target(false).abs_diff_eq(Vec3::new(0.85 * 0.85, 0.9 * 0.905, 1.0), 1e-6));
        assert_eq!(v.scale_target(true), IMAGE_SCALE);
        v.hovered = false;
        assert_eq!(v.scale_target(false), IMAGE_SCALE);
    }

    #[test]
    fn test_tint_moves_toward_orange_when_hovered() {
        let mut v = FrameVisual::new(0.0);
        v.hovered = true;
        for _ in 0..60 {
            v.animate(false, 0.0, 1.0 / 60.0);
        }
        assert!(v.tint.abs_diff_eq(TINT_HOVER, 1e-3));
        v.hovered = false;
        for _ in 0..60 {
            v.animate(false, 1.0, 1.0 / 60.0);
        }
        assert!(v.tint.abs_diff_eq(TINT_IDLE, 1e-3));
    }

    #[test]
    fn test_zoom_stays_in_band() {
        let mut v = FrameVisual::new(0.123);
        for i in 0..200 {
            v.animate(false, i as f32 * 0.37, 0.016);
            assert!((1.5..=2.5).contains(&v.zoom));
        }
    }

    #[test]
    fn test_frames_face_inward() {
        for d in gallery() {
            let facing = d.local_transform().transform_vector3(Vec3::Z);
            // Left wall faces +X, right wall faces -X
            assert!(facing.x * d.position.x < 0.0);
        }
    }
}
