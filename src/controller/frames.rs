use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use tracing::debug;

use crate::config::frames::{FOCUS_OFFSET, GROUP_OFFSET, OVERVIEW_POSITION};
use crate::controller::router::{Route, Router};
use crate::model::frame::{caption_anchor, outer_box_transform};
use crate::model::{FrameDescriptor, FrameId, FrameVisual};

/// Pose the view should settle on: the overview or one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl FocusPose {
    pub const OVERVIEW: Self = Self {
        position: OVERVIEW_POSITION,
        orientation: Quat::IDENTITY,
    };
}

impl Default for FocusPose {
    fn default() -> Self {
        Self::OVERVIEW
    }
}

/// One gallery frame in the arena
pub struct FrameEntity {
    pub descriptor: FrameDescriptor,
    pub id: FrameId,
    pub caption: String,
    pub visual: FrameVisual,
    local: Mat4,
}

/// Owns the frames, resolves the routed frame to a focus pose and turns
/// clicks into navigation.
pub struct FrameGroup {
    root: Mat4,
    frames: Vec<FrameEntity>,
    index: HashMap<String, usize>,
    focused: Option<usize>,
    focus: FocusPose,
}

impl FrameGroup {
    pub fn new(descriptors: Vec<FrameDescriptor>) -> Self {
        Self::with_visuals(descriptors.into_iter().map(|d| (d, FrameVisual::random())))
    }

    /// Build with explicit visual state (fixed phases)
    pub fn with_visuals(frames: impl IntoIterator<Item = (FrameDescriptor, FrameVisual)>) -> Self {
        let frames: Vec<FrameEntity> = frames
            .into_iter()
            .map(|(descriptor, visual)| {
                let id = FrameId::from_url(&descriptor.url);
                FrameEntity {
                    caption: id.caption(),
                    local: descriptor.local_transform(),
                    descriptor,
                    id,
                    visual,
                }
            })
            .collect();
        let index = frames
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.as_str().to_string(), i))
            .collect();

        Self {
            root: Mat4::from_translation(GROUP_OFFSET),
            frames,
            index,
            focused: None,
            focus: FocusPose::OVERVIEW,
        }
    }

    pub fn frames(&self) -> &[FrameEntity] {
        &self.frames
    }

    pub fn get(&self, id: &str) -> Option<&FrameEntity> {
        self.lookup(id).map(|i| &self.frames[i])
    }

    fn lookup(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// World transform of a frame group (the clicked box's parent)
    pub fn parent_world(&self, index: usize) -> Mat4 {
        self.root * self.frames[index].local
    }

    /// World transform of a frame's clickable outer box
    pub fn box_world(&self, index: usize) -> Mat4 {
        self.parent_world(index) * outer_box_transform()
    }

    pub fn caption_world(&self, index: usize) -> Vec3 {
        self.parent_world(index).transform_point3(caption_anchor())
    }

    pub fn focus(&self) -> FocusPose {
        self.focus
    }

    pub fn focused(&self) -> Option<&FrameEntity> {
        self.focused.map(|i| &self.frames[i])
    }

    /// Recompute the focus pose from the route parameter. Idempotent.
    pub fn update_focus(&mut self, route_param: Option<&str>) -> FocusPose {
        self.focused = route_param.and_then(|id| self.lookup(id));
        self.focus = match self.focused {
            Some(i) => {
                let parent = self.parent_world(i);
                let (_, orientation, _) = parent.to_scale_rotation_translation();
                FocusPose {
                    position: parent.transform_point3(FOCUS_OFFSET),
                    orientation,
                }
            }
            None => FocusPose::OVERVIEW,
        };
        self.focus
    }

    /// Route a click. `hit` is the frame under the pointer, None for a miss.
    /// Clicking the focused frame again returns to the overview.
    pub fn click(&self, hit: Option<&FrameId>, router: &mut Router) {
        let route = match hit {
            Some(id) if self.focused().is_some_and(|f| &f.id == id) => Route::Overview,
            Some(id) => Route::item(id.as_str()),
            None => Route::Overview,
        };
        debug!(?hit, ?route, "frame click");
        router.navigate(route);
    }

    /// Nearest frame hit by a world-space ray, with its distance
    pub fn pick(&self, origin: Vec3, dir: Vec3) -> Option<(usize, f32)> {
        (0..self.frames.len())
            .filter_map(|i| ray_box(self.box_world(i), origin, dir).map(|t| (i, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Pointer over `hit` (or nothing): exactly that frame is hovered
    pub fn set_hovered(&mut self, hit: Option<usize>) {
        for (i, frame) in self.frames.iter_mut().enumerate() {
            frame.visual.hovered = Some(i) == hit;
        }
    }

    pub fn any_hovered(&self) -> bool {
        self.frames.iter().any(|f| f.visual.hovered)
    }

    /// Advance every frame's zoom, scale and tint
    pub fn animate(&mut self, elapsed: f32, dt: f32) {
        let focused = self.focused;
        for (i, frame) in self.frames.iter_mut().enumerate() {
            frame.visual.animate(focused == Some(i), elapsed, dt);
        }
    }
}

/// Ray against a unit cube placed by `transform`. Returns the distance
/// along `dir` to the entry point, or to the exit point when the origin is
/// inside.
fn ray_box(transform: Mat4, origin: Vec3, dir: Vec3) -> Option<f32> {
    let inv = transform.inverse();
    let o = inv.transform_point3(origin);
    let d = inv.transform_vector3(dir);

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        if d[axis].abs() < 1e-8 {
            if o[axis].abs() > 0.5 {
                return None;
            }
            continue;
        }
        let t1 = (-0.5 - o[axis]) / d[axis];
        let t2 = (0.5 - o[axis]) / d[axis];
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    if t_max < t_min.max(0.0) {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::frame::gallery;
    use std::f32::consts::PI;

    fn group() -> FrameGroup {
        FrameGroup::with_visuals(
            gallery()
                .into_iter()
                .enumerate()
                .map(|(i, d)| (d, FrameVisual::new(i as f32 * 0.1))),
        )
    }

    fn id_of(group: &FrameGroup, i: usize) -> String {
        group.frames()[i].id.as_str().to_string()
    }

    #[test]
    fn test_no_route_is_overview() {
        let mut g = group();
        assert_eq!(g.update_focus(None), FocusPose::OVERVIEW);
        assert_eq!(g.focus().position, Vec3::new(0.0, 0.0, 5.5));
        assert_eq!(g.focus().orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_unknown_route_is_overview() {
        let mut g = group();
        let first = id_of(&g, 0);
        g.update_focus(Some(&first));
        assert_eq!(g.update_focus(Some("not-a-frame")), FocusPose::OVERVIEW);
        assert!(g.focused().is_none());
    }

    #[test]
    fn test_focus_on_frame() {
        let mut g = group();
        for i in 0..g.frames().len() {
            let id = id_of(&g, i);
            let pose = g.update_focus(Some(&id));
            let expected = g.parent_world(i).transform_point3(FOCUS_OFFSET);
            assert!(pose.position.abs_diff_eq(expected, 1e-5));
        }
    }

    #[test]
    fn test_focus_on_left_frame_values() {
        let mut g = group();
        let id = id_of(&g, 0);
        let pose = g.update_focus(Some(&id));
        let rot = Quat::from_rotation_y(PI / 2.5);
        let expected = Vec3::new(-1.75, 0.5, 0.25) + rot * FOCUS_OFFSET;
        assert!(pose.position.abs_diff_eq(expected, 1e-5));
        assert!(pose.orientation.abs_diff_eq(rot, 1e-5));
    }

    #[test]
    fn test_focus_is_idempotent() {
        let mut g = group();
        let id = id_of(&g, 4);
        let a = g.update_focus(Some(&id));
        let b = g.update_focus(Some(&id));
        assert_eq!(a, b);
    }

    #[test]
    fn test_click_other_frame_focuses_it() {
        let mut g = group();
        let mut router = Router::default();
        g.update_focus(router.route_param());
        let target = g.frames()[2].id.clone();
        g.click(Some(&target), &mut router);
        assert_eq!(router.route_param(), Some(target.as_str()));

        g.update_focus(router.route_param());
        let other = g.frames()[3].id.clone();
        g.click(Some(&other), &mut router);
        assert_eq!(router.route_param(), Some(other.as_str()));
    }

    #[test]
    fn test_click_focused_frame_returns_to_overview() {
        let mut g = group();
        let target = g.frames()[1].id.clone();
        let mut router = Router::new(&Route::item(target.as_str()).path());
        g.update_focus(router.route_param());
        g.click(Some(&target), &mut router);
        assert_eq!(router.route(), &Route::Overview);
    }

    #[test]
    fn test_click_miss_returns_to_overview() {
        let mut g = group();
        let target = g.frames()[5].id.clone();
        let mut router = Router::new(&Route::item(target.as_str()).path());
        g.update_focus(router.route_param());
        g.click(None, &mut router);
        assert_eq!(router.location(), "/");
    }

    #[test]
    fn test_pick_hits_frame_center() {
        let g = group();
        for i in 0..g.frames().len() {
            let center = g.box_world(i).transform_point3(Vec3::ZERO);
            let origin = Vec3::new(0.0, 1.3, 6.0);
            let (hit, t) = g.pick(origin, (center - origin).normalize()).unwrap();
            assert_eq!(hit, i);
            assert!(t > 0.0 && t < origin.distance(center));
        }
    }

    #[test]
    fn test_pick_misses_empty_space() {
        let g = group();
        assert!(g.pick(Vec3::new(0.0, 1.0, 6.0), Vec3::NEG_Z).is_none());
        assert!(g.pick(Vec3::new(0.0, 10.0, 6.0), Vec3::Y).is_none());
    }

    #[test]
    fn test_ray_box_from_inside_returns_exit() {
        let t = ray_box(Mat4::IDENTITY, Vec3::ZERO, Vec3::X).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
        assert!(ray_box(Mat4::IDENTITY, Vec3::new(2.0, 0.0, 0.0), Vec3::X).is_none());
    }

    #[test]
    fn test_hover_is_exclusive() {
        let mut g = group();
        g.set_hovered(Some(3));
        assert_eq!(g.frames().iter().filter(|f| f.visual.hovered).count(), 1);
        assert!(g.frames()[3].visual.hovered);
        g.set_hovered(None);
        assert!(!g.any_hovered());
    }

    #[test]
    fn test_focused_frame_keeps_full_scale_when_hovered() {
        let mut g = group();
        let id = id_of(&g, 0);
        g.update_focus(Some(&id));
        g.set_hovered(Some(0));
        for i in 0..120 {
            g.animate(i as f32 / 60.0, 1.0 / 60.0);
        }
        let focused = &g.frames()[0].visual;
        assert!(focused.image_scale.abs_diff_eq(crate::config::frames::IMAGE_SCALE, 1e-3));
        assert!(focused.tint.abs_diff_eq(crate::config::frames::TINT_HOVER, 1e-3));
    }
}
