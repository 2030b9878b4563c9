use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;
use web_sys::{HtmlCanvasElement, Window};

use crate::scene::Scene;
use crate::ui::{self, FpsCounter};
use crate::view::{GpuContext, RenderState, UiFrame};

/// Per-frame state of the browser host
pub struct FrameLoopContext {
    pub gpu: GpuContext,
    pub render_state: RenderState,
    pub scene: Rc<RefCell<Scene>>,
    pub canvas: HtmlCanvasElement,
    pub egui_ctx: egui::Context,
    pub egui_events: Rc<RefCell<Vec<egui::Event>>>,
    fps: FpsCounter,
    last_time: f64,
    cursor_pointer: bool,
}

impl FrameLoopContext {
    pub fn new(
        gpu: GpuContext,
        render_state: RenderState,
        scene: Rc<RefCell<Scene>>,
        canvas: HtmlCanvasElement,
        egui_events: Rc<RefCell<Vec<egui::Event>>>,
        now: f64,
    ) -> Self {
        Self {
            gpu,
            render_state,
            scene,
            canvas,
            egui_ctx: egui::Context::default(),
            egui_events,
            fps: FpsCounter::default(),
            last_time: now,
            cursor_pointer: false,
        }
    }

    /// Advance the scene and draw one frame
    pub fn frame(&mut self, window: &Window) {
        // Time step
        let now = window.performance().map(|p| p.now()).unwrap_or(self.last_time);
        let dt = ((now - self.last_time) / 1000.0).max(0.0) as f32;
        self.last_time = now;
        let fps = self.fps.tick(dt);

        self.handle_resize(window);

        let mut scene = self.scene.borrow_mut();
        scene.tick(dt);
        self.render_state.update_camera(&self.gpu.queue, scene.camera());
        let cursor_pointer = scene.cursor_pointer();

        // Build egui input from queued events
        let dpr = window.device_pixel_ratio() as f32;
        let viewport = scene.viewport();
        let mut raw_input = egui::RawInput::default();
        raw_input.time = Some(now / 1000.0);
        raw_input.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::new(0.0, 0.0),
            egui::vec2(viewport.x, viewport.y),
        ));
        raw_input.events.extend(self.egui_events.borrow_mut().drain(..));
        self.egui_ctx.set_pixels_per_point(dpr);

        let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &scene, fps, 1.0);
        let primitives = self
            .egui_ctx
            .tessellate(std::mem::take(&mut full_output.shapes), dpr);
        let ui_frame = UiFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point: dpr,
        };

        let mesh = scene.build_mesh();
        drop(scene);
        self.update_cursor(cursor_pointer);

        if let Err(e) = self.render_state.draw_frame(
            &self.gpu.device,
            &self.gpu.queue,
            &self.gpu.surface,
            &mesh,
            Some(ui_frame),
        ) {
            warn!(error = %e, "frame skipped");
        }
    }

    /// Keep canvas, surface and scene viewport in step with the window
    fn handle_resize(&mut self, window: &Window) {
        let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) else {
            return;
        };
        let css_w = w.as_f64().unwrap_or(800.0);
        let css_h = h.as_f64().unwrap_or(600.0);
        let dpr = window.device_pixel_ratio();
        let width = (css_w * dpr) as u32;
        let height = (css_h * dpr) as u32;
        if width == self.render_state.width && height == self.render_state.height {
            return;
        }

        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.render_state
            .resize(&self.gpu.device, &self.gpu.surface, width, height);
        self.scene.borrow_mut().resize(css_w as u32, css_h as u32);
    }

    fn update_cursor(&mut self, pointer: bool) {
        if pointer == self.cursor_pointer {
            return;
        }
        self.cursor_pointer = pointer;
        let cursor = if pointer { "pointer" } else { "auto" };
        if let Err(e) = self.canvas.style().set_property("cursor", cursor) {
            warn!(error = ?e, "failed to set cursor");
        }
    }
}
