use glam::Vec3;

use gallery_walk::config;
use gallery_walk::controller::{FocusPose, FrameGroup, InputEvent, PointerEvent, Route};
use gallery_walk::model::frame::gallery;
use gallery_walk::model::FrameVisual;
use gallery_walk::Scene;

const DT: f32 = 1.0 / 60.0;
const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn scene_at(location: &str) -> Scene {
    let frames = FrameGroup::with_visuals(
        gallery()
            .into_iter()
            .enumerate()
            .map(|(i, d)| (d, FrameVisual::new(i as f32 / 6.0))),
    );
    Scene::with_frames(WIDTH, HEIGHT, location, frames)
}

fn run(scene: &mut Scene, ticks: usize) {
    for _ in 0..ticks {
        scene.tick(DT);
    }
}

/// Fresh scene with the avatar resting on the floor
fn landed() -> Scene {
    let mut scene = scene_at("/");
    run(&mut scene, 180);
    scene
}

fn press(scene: &mut Scene, x: f32, y: f32) {
    scene.handle_event(&InputEvent::Pointer(PointerEvent::Down { x, y }));
}

fn release(scene: &mut Scene, x: f32, y: f32) {
    scene.handle_event(&InputEvent::Pointer(PointerEvent::Up { x, y }));
}

fn click(scene: &mut Scene, x: f32, y: f32) {
    press(scene, x, y);
    release(scene, x, y);
}

/// Screen position of frame `i`'s centre
fn frame_on_screen(scene: &Scene, i: usize) -> (f32, f32) {
    let center = scene.frames().box_world(i).transform_point3(Vec3::ZERO);
    let px = scene
        .camera()
        .project(center, WIDTH as f32, HEIGHT as f32)
        .expect("frame in front of the camera");
    (px.x, px.y)
}

#[test]
fn avatar_lands_and_camera_follows() {
    let scene = landed();
    let pos = scene.avatar_position().unwrap();
    assert!((pos.y - 1.25).abs() < 0.1, "avatar rests at {pos:?}");
    assert!(scene.player().is_grounded());
    assert!(scene
        .camera()
        .eye
        .abs_diff_eq(pos + config::player::CAMERA_OFFSET, 1e-4));
}

#[test]
fn idle_avatar_has_no_horizontal_velocity() {
    let scene = landed();
    let vel = scene.avatar_velocity().unwrap();
    assert_eq!(vel.x, 0.0);
    assert_eq!(vel.z, 0.0);
}

#[test]
fn holding_the_pointer_walks_toward_it() {
    let mut scene = landed();
    // 200 px right of and 100 px below the centre
    press(&mut scene, 600.0, 400.0);
    run(&mut scene, 1);
    let vel = scene.avatar_velocity().unwrap();
    assert!((vel.x - 2.0).abs() < 1e-4, "{vel:?}");
    assert!((vel.z - 1.0).abs() < 1e-4, "{vel:?}");

    let start = scene.avatar_position().unwrap();
    run(&mut scene, 60);
    let moved = scene.avatar_position().unwrap() - start;
    assert!(moved.x > 1.0 && moved.z > 0.5, "moved {moved:?}");

    // Releasing far away is not a click and stops the walk
    release(&mut scene, 10.0, 10.0);
    run(&mut scene, 1);
    let vel = scene.avatar_velocity().unwrap();
    assert_eq!((vel.x, vel.z), (0.0, 0.0));
    assert_eq!(scene.router().location(), "/");
}

#[test]
fn arrow_keys_alone_do_not_move_the_avatar() {
    let mut scene = landed();
    let start = scene.avatar_position().unwrap();
    scene.handle_event(&InputEvent::KeyDown("ArrowUp".into()));
    scene.handle_event(&InputEvent::KeyDown("a".into()));
    run(&mut scene, 30);
    let end = scene.avatar_position().unwrap();
    assert!((end.x - start.x).abs() < 1e-3 && (end.z - start.z).abs() < 1e-3);
    assert_eq!(scene.player().key_intent(), Vec3::new(1.0, 0.0, -1.0));

    scene.handle_event(&InputEvent::FocusLost);
    run(&mut scene, 1);
    assert_eq!(scene.player().key_intent(), Vec3::ZERO);
}

#[test]
fn jump_only_from_the_ground() {
    let mut scene = landed();
    scene.handle_event(&InputEvent::KeyDown(" ".into()));
    run(&mut scene, 1);
    let vel = scene.avatar_velocity().unwrap();
    assert_eq!(vel, Vec3::new(0.0, config::player::JUMP_IMPULSE, 0.0));
    scene.handle_event(&InputEvent::KeyUp(" ".into()));

    run(&mut scene, 10);
    let pos = scene.avatar_position().unwrap();
    assert!(pos.y > 1.5, "avatar rose to {pos:?}");
    assert!(!scene.player().is_grounded());

    // Holding jump in the air never adds another impulse
    scene.handle_event(&InputEvent::KeyDown(" ".into()));
    run(&mut scene, 1);
    assert!(scene.avatar_velocity().unwrap().y < config::player::JUMP_IMPULSE);
}

#[test]
fn clicking_a_frame_focuses_it_and_clicking_again_returns() {
    let mut scene = landed();
    let (x, y) = frame_on_screen(&scene, 0);
    let hit = scene.pick(x, y).expect("frame under the pointer");
    let id = scene.frames().frames()[hit].id.clone();

    click(&mut scene, x, y);
    assert_eq!(scene.router().route(), &Route::item(id.as_str()));
    assert_eq!(scene.frames().focused().map(|f| &f.id), Some(&id));

    let target = scene.frames().focus();
    assert_ne!(target, FocusPose::OVERVIEW);
    run(&mut scene, 300);
    assert!(scene.focus_view().position.abs_diff_eq(target.position, 1e-3));
    assert!(scene.focus_view().orientation.abs_diff_eq(target.orientation, 1e-3));

    click(&mut scene, x, y);
    assert_eq!(scene.router().location(), "/");
    run(&mut scene, 300);
    assert!(scene
        .focus_view()
        .position
        .abs_diff_eq(config::frames::OVERVIEW_POSITION, 1e-3));
}

#[test]
fn clicking_empty_space_returns_to_overview_and_swings_the_hand() {
    let mut scene = landed();
    let (x, y) = frame_on_screen(&scene, 3);
    click(&mut scene, x, y);
    assert!(scene.router().route_param().is_some());

    // Straight up into the sky
    click(&mut scene, 400.0, 2.0);
    assert_eq!(scene.router().route(), &Route::Overview);
    assert_eq!(scene.player().hand.joint_angle, config::player::SWING_ANGLE);

    // The bob smoothing eases the joint back
    run(&mut scene, 60);
    assert!(scene.player().hand.joint_angle.abs() < 0.01);
}

#[test]
fn deep_link_focuses_on_start() {
    let id = gallery_walk::model::FrameId::from_url(&gallery()[4].url);
    let mut scene = scene_at(&Route::item(id.as_str()).path());
    run(&mut scene, 1);
    assert_eq!(scene.frames().focused().map(|f| &f.id), Some(&id));

    let mut stale = scene_at("/item/unknown");
    run(&mut stale, 1);
    assert!(stale.frames().focused().is_none());
    assert_eq!(stale.frames().focus(), FocusPose::OVERVIEW);
}

#[test]
fn hovering_a_frame_requests_a_pointer_cursor() {
    let mut scene = landed();
    let (x, y) = frame_on_screen(&scene, 1);
    scene.handle_event(&InputEvent::Pointer(PointerEvent::Move { x, y }));
    assert!(scene.cursor_pointer());

    run(&mut scene, 60);
    let hovered = scene.frames().frames().iter().find(|f| f.visual.hovered).unwrap();
    assert!(hovered.visual.tint.abs_diff_eq(config::frames::TINT_HOVER, 1e-2));

    scene.handle_event(&InputEvent::Pointer(PointerEvent::Move { x: 400.0, y: 2.0 }));
    assert!(!scene.cursor_pointer());
}
