use egui::Context;

use crate::config;
use crate::scene::Scene;

/// Build the overlay: frame captions and the debug window.
///
/// `points_per_unit` converts scene viewport units (the unit pointer events
/// arrive in) into egui points.
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    scene: &Scene,
    fps: f32,
    points_per_unit: f32,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_captions(ctx, scene, points_per_unit);
        draw_debug_window(ctx, scene, fps);
    })
}

/// Smoothed frames-per-second counter
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    timer: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.frames += 1;
        self.timer += dt;
        if self.timer >= 1.0 {
            self.fps = self.frames as f32 / self.timer;
            self.frames = 0;
            self.timer = 0.0;
        }
        self.fps
    }
}

fn draw_captions(ctx: &Context, scene: &Scene, points_per_unit: f32) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Background, egui::Id::new("captions")));
    let viewport = scene.viewport();

    for (i, frame) in scene.frames().frames().iter().enumerate() {
        let anchor = scene.frames().caption_world(i);
        let Some(px) = scene.camera().project(anchor, viewport.x, viewport.y) else {
            continue;
        };
        painter.text(
            egui::pos2(px.x * points_per_unit, px.y * points_per_unit),
            egui::Align2::LEFT_TOP,
            &frame.caption,
            egui::FontId::proportional(config::frames::CAPTION_SIZE),
            egui::Color32::BLACK,
        );
    }
}

fn draw_debug_window(ctx: &Context, scene: &Scene, fps: f32) {
    let pos = scene.avatar_position().unwrap_or_default();
    let vel = scene.avatar_velocity().unwrap_or_default();
    let player = scene.player();
    let focus = scene.focus_view();
    let intent = player.key_intent();
    let hovered_zoom = scene
        .frames()
        .frames()
        .iter()
        .find(|f| f.visual.hovered)
        .map(|f| f.visual.zoom);

    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {fps:.0}")).small());
            ui.label(egui::RichText::new(format!("Pos: x: {:.2} y: {:.2} z: {:.2}", pos.x, pos.y, pos.z)).small());
            ui.label(egui::RichText::new(format!("Vel: x: {:.2} y: {:.2} z: {:.2}", vel.x, vel.y, vel.z)).small());
            ui.label(egui::RichText::new(format!("Grounded: {}", player.is_grounded())).small());
            ui.label(egui::RichText::new(format!("Route: {}", scene.router().location())).small());
            ui.label(
                egui::RichText::new(format!(
                    "Focus: {:.2} {:.2} {:.2}",
                    focus.position.x, focus.position.y, focus.position.z
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("Keys: {:.0} {:.0}", intent.x, intent.z)).small());
            if let Some(zoom) = hovered_zoom {
                ui.label(egui::RichText::new(format!("Zoom: {zoom:.2}")).small());
            }
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("Hold mouse - Walk toward pointer").small());
            ui.label(egui::RichText::new("Space - Jump").small());
            ui.label(egui::RichText::new("Click frame - Focus / unfocus").small());
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_counter_updates_once_per_second() {
        let mut fps = FpsCounter::default();
        for _ in 0..59 {
            assert_eq!(fps.tick(1.0 / 60.0), 0.0);
        }
        let value = fps.tick(1.0 / 60.0 + 1e-4);
        assert!((value - 60.0).abs() < 0.1);
    }

    #[test]
    fn test_overlay_runs_headless() {
        let ctx = Context::default();
        let mut scene = Scene::new(800, 600);
        scene.tick(1.0 / 60.0);
        for _ in 0..2 {
            let mut raw = egui::RawInput::default();
            raw.screen_rect = Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0)));
            let output = build_ui(&ctx, raw, &scene, 60.0, 1.0);
            assert!(output.textures_delta.free.is_empty());
        }
    }
}
