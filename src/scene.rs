use glam::{Mat4, Vec2, Vec3};
use rapier3d::prelude::RigidBodyHandle;
use tracing::{debug, info};

use crate::config;
use crate::config::pointer::{CLICK_SLOP, MAX_DT};
use crate::controller::frames::{FocusPose, FrameGroup};
use crate::controller::input::{
    InputEvent, InputProcessor, InputState, KeyBindings, PointerEvent, PointerHub,
};
use crate::controller::physics::{PhysicsWorld, RigidBodyWorld};
use crate::controller::player::PlayerController;
use crate::controller::router::Router;
use crate::model::frame::{gallery, image_transform, inner_box_transform};
use crate::model::Camera;
use crate::utils::{create_ground_mesh, damp3, damp_quat, Mesh};

/// Hand tool placement relative to the hand group, in view space
const TOOL_OFFSET: Vec3 = Vec3::new(0.45, -0.4, 0.0);
const TOOL_SIZE: Vec3 = Vec3::new(0.12, 0.12, 0.9);
const TOOL_COLOR: [f32; 4] = [0.35, 0.25, 0.18, 1.0];

/// Everything that changes per frame, without any GPU state.
///
/// Native and web hosts feed it [`InputEvent`]s and call [`Scene::tick`]
/// once per animation frame, then draw [`Scene::build_mesh`].
pub struct Scene {
    physics: PhysicsWorld,
    router: Router,
    input: InputState,
    processor: InputProcessor,
    pointer: PointerHub,
    camera: Camera,
    player: PlayerController<RigidBodyHandle>,
    frames: FrameGroup,
    /// Damped view of the focus target
    focus_view: FocusPose,
    ground: RigidBodyHandle,
    elapsed: f32,
    last_dt: f32,
    viewport: Vec2,
    press: Option<Vec2>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_location(width, height, "/")
    }

    /// Scene opened at `location`, e.g. a deep link to `/item/<id>`
    pub fn with_location(width: u32, height: u32, location: &str) -> Self {
        Self::build(width, height, location, FrameGroup::new(gallery()))
    }

    /// Scene with a prepared frame group (fixed visual phases)
    pub fn with_frames(width: u32, height: u32, location: &str, frames: FrameGroup) -> Self {
        Self::build(width, height, location, frames)
    }

    fn build(width: u32, height: u32, location: &str, frames: FrameGroup) -> Self {
        let mut physics = PhysicsWorld::default();
        let ground = physics.spawn_ground();
        let avatar = physics.spawn_avatar(config::player::SPAWN_POSITION);

        let pointer = PointerHub::new();
        let mut player = PlayerController::new();
        player.attach(avatar);
        player.mount(&pointer);

        let mut camera = Camera::new(width, height);
        camera.eye = config::player::SPAWN_POSITION + config::player::CAMERA_OFFSET;

        info!(width, height, location, frames = frames.frames().len(), "scene created");

        Self {
            physics,
            router: Router::new(location),
            input: InputState::new(),
            processor: InputProcessor::new(KeyBindings::default()),
            pointer,
            camera,
            player,
            frames,
            focus_view: FocusPose::OVERVIEW,
            ground,
            elapsed: 0.0,
            last_dt: 0.0,
            viewport: Vec2::new(width.max(1) as f32, height.max(1) as f32),
            press: None,
        }
    }

    /// Feed one host event. Pointer events reach the document-level hub
    /// (drag tracking) and drive hover and click picking.
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.input.process_event(event);

        let InputEvent::Pointer(pointer) = event else { return };
        self.pointer.dispatch(pointer);

        match *pointer {
            PointerEvent::Down { x, y } => {
                self.press = Some(Vec2::new(x, y));
            }
            PointerEvent::Move { x, y } => self.hover(x, y),
            PointerEvent::Up { x, y } => {
                let release = Vec2::new(x, y);
                if self.press.take().is_some_and(|p| p.distance(release) <= CLICK_SLOP) {
                    self.click(x, y);
                }
            }
            PointerEvent::Cancel => self.press = None,
        }
    }

    /// Frame under a viewport pixel, nearest first
    pub fn pick(&self, x: f32, y: f32) -> Option<usize> {
        let (origin, dir) = self.camera.screen_ray(x, y, self.viewport.x, self.viewport.y);
        self.frames.pick(origin, dir).map(|(index, _)| index)
    }

    pub fn hover(&mut self, x: f32, y: f32) {
        let hit = self.pick(x, y);
        self.frames.set_hovered(hit);
    }

    /// Click at a viewport pixel: focus the frame under it, or return to the
    /// overview. A miss also swings the hand.
    pub fn click(&mut self, x: f32, y: f32) {
        let hit = self.pick(x, y).map(|i| self.frames.frames()[i].id.clone());
        if hit.is_none() {
            self.player.hand.swing();
        }
        self.frames.click(hit.as_ref(), &mut self.router);
        self.frames.update_focus(self.router.route_param());
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        self.camera.set_aspect(width, height);
        debug!(width, height, "scene resized");
    }

    /// Advance one frame: physics, player, focus, frame animation, then the
    /// damped focus view.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
        self.last_dt = dt;
        if dt > 0.0 {
            self.physics.step(dt);
        }
        self.elapsed += dt;

        let actions = self.processor.poll(&self.input);
        self.player
            .tick(&mut self.physics, &mut self.camera, actions, self.elapsed, self.viewport);

        let target = self.frames.update_focus(self.router.route_param());
        self.frames.animate(self.elapsed, dt);

        let smooth = config::frames::FOCUS_SMOOTH_TIME;
        self.focus_view = FocusPose {
            position: damp3(self.focus_view.position, target.position, smooth, dt),
            orientation: damp_quat(self.focus_view.orientation, target.orientation, smooth, dt),
        };
    }

    /// Frames and hand as one vertex-coloured mesh, rebuilt every frame
    pub fn build_mesh(&self) -> Mesh {
        let mut mesh = Mesh::empty();
        let [r, g, b] = config::frames::OUTER_COLOR;

        for (i, frame) in self.frames.frames().iter().enumerate() {
            let outer = self.frames.box_world(i);
            mesh.push_box(outer, [r, g, b, 1.0]);
            mesh.push_box(outer * inner_box_transform(), frame.visual.tint.extend(1.0).to_array());

            let [sr, sg, sb] = frame.id.swatch();
            let tint = frame.visual.tint;
            mesh.push_quad(
                outer * image_transform(frame.visual.image_scale),
                [sr * tint.x, sg * tint.y, sb * tint.z, 1.0],
            );
        }

        let hand = &self.player.hand;
        let tool = Mat4::from_translation(hand.rotation * TOOL_OFFSET)
            * hand.tool_transform()
            * Mat4::from_scale(TOOL_SIZE);
        mesh.push_box(tool, TOOL_COLOR);

        mesh
    }

    /// Static floor geometry
    pub fn ground_mesh() -> Mesh {
        create_ground_mesh(
            config::physics::GROUND_PLANE_Y,
            config::physics::GROUND_PLANE_SIZE,
            config::physics::GROUND_COLOR,
        )
    }

    /// Host should show a pointer cursor
    pub fn cursor_pointer(&self) -> bool {
        self.frames.any_hovered()
    }

    pub fn avatar_position(&self) -> Option<Vec3> {
        self.player.body().and_then(|b| self.physics.translation(b))
    }

    pub fn avatar_velocity(&self) -> Option<Vec3> {
        self.player.body().and_then(|b| self.physics.linvel(b))
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn player(&self) -> &PlayerController<RigidBodyHandle> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerController<RigidBodyHandle> {
        &mut self.player
    }

    pub fn frames(&self) -> &FrameGroup {
        &self.frames
    }

    pub fn pointer(&self) -> &PointerHub {
        &self.pointer
    }

    pub fn processor(&self) -> &InputProcessor {
        &self.processor
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn ground(&self) -> RigidBodyHandle {
        self.ground
    }

    pub fn focus_view(&self) -> FocusPose {
        self.focus_view
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FrameVisual;

    fn scene() -> Scene {
        let frames = FrameGroup::with_visuals(
            gallery().into_iter().map(|d| (d, FrameVisual::new(0.25))),
        );
        Scene::with_frames(800, 600, "/", frames)
    }

    #[test]
    fn test_new_scene_mounts_player() {
        let s = scene();
        assert!(s.player().is_mounted());
        assert_eq!(s.pointer().listener_count(), 1);
        assert_eq!(s.focus_view(), FocusPose::OVERVIEW);
    }

    #[test]
    fn test_zero_dt_does_not_step() {
        let mut s = scene();
        let before = s.avatar_position().unwrap();
        s.tick(0.0);
        assert_eq!(s.avatar_position().unwrap(), before);
        assert_eq!(s.elapsed(), 0.0);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut s = scene();
        s.tick(5.0);
        assert_eq!(s.last_dt(), MAX_DT);
        s.tick(f32::NAN);
        assert_eq!(s.last_dt(), 0.0);
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut s = scene();
        s.handle_event(&InputEvent::Pointer(PointerEvent::Down { x: 10.0, y: 10.0 }));
        s.handle_event(&InputEvent::Pointer(PointerEvent::Up { x: 200.0, y: 10.0 }));
        assert_eq!(s.player().hand.joint_angle, 0.0);
    }

    #[test]
    fn test_click_on_sky_swings_hand() {
        let mut s = scene();
        s.handle_event(&InputEvent::Pointer(PointerEvent::Down { x: 400.0, y: 5.0 }));
        s.handle_event(&InputEvent::Pointer(PointerEvent::Up { x: 400.0, y: 5.0 }));
        assert_eq!(s.player().hand.joint_angle, config::player::SWING_ANGLE);
        assert_eq!(s.router().location(), "/");
    }

    #[test]
    fn test_mesh_counts() {
        let s = scene();
        let mesh = s.build_mesh();
        // Per frame: two boxes and a quad; plus the tool box
        let faces = 6 * (6 + 6 + 1) + 6;
        assert_eq!(mesh.vertices.len(), faces * 4);
        assert_eq!(mesh.indices.len(), faces * 6);
    }
}
