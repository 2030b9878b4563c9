use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{CursorIcon, Window, WindowId};

// Import from the library crate
use gallery_walk::controller::{InputEvent, PointerEvent};
use gallery_walk::ui::{self, FpsCounter};
use gallery_walk::view::{GpuContext, RenderState, UiFrame};
use gallery_walk::{config, logging, GalleryError, Scene};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    scene: Scene,

    // Input handling
    cursor: PhysicalPosition<f64>,
    cursor_pointer: bool,

    // Frame timing
    last_frame_time: Instant,
    fps: FpsCounter,
}

impl App {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self, GalleryError> {
        let attributes = Window::default_attributes()
            .with_title(config::window::TITLE)
            .with_inner_size(LogicalSize::new(config::window::WIDTH, config::window::HEIGHT));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| GalleryError::Window(e.to_string()))?,
        );
        let size = window.inner_size();

        let gpu = pollster::block_on(GpuContext::new_native(window.clone(), size.width, size.height))?;
        let render_state = RenderState::new(
            &gpu.device,
            &gpu.queue,
            gpu.format,
            gpu.config.alpha_mode,
            gpu.config.width,
            gpu.config.height,
            &Scene::ground_mesh(),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            None,
            None,
            None,
        );

        info!(width = size.width, height = size.height, "window created");

        Ok(Self {
            window,
            gpu,
            render_state,
            egui_state,
            egui_ctx,
            scene: Scene::new(size.width, size.height),
            cursor: PhysicalPosition::new(0.0, 0.0),
            cursor_pointer: false,
            last_frame_time: Instant::now(),
            fps: FpsCounter::default(),
        })
    }

    /// Translate a window event into scene input
    fn input(&mut self, event: &WindowEvent, egui_consumed: bool) {
        let input = match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, logical_key, .. }, .. } => {
                let Some(key) = key_name(logical_key) else { return };
                match state {
                    ElementState::Pressed => InputEvent::KeyDown(key),
                    ElementState::Released => InputEvent::KeyUp(key),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = *position;
                InputEvent::Pointer(PointerEvent::Move { x: position.x as f32, y: position.y as f32 })
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                let (x, y) = (self.cursor.x as f32, self.cursor.y as f32);
                match state {
                    // Presses on the overlay stay with egui
                    ElementState::Pressed if egui_consumed => return,
                    ElementState::Pressed => InputEvent::Pointer(PointerEvent::Down { x, y }),
                    ElementState::Released => InputEvent::Pointer(PointerEvent::Up { x, y }),
                }
            }
            WindowEvent::CursorLeft { .. } => InputEvent::Pointer(PointerEvent::Cancel),
            WindowEvent::Focused(false) => InputEvent::FocusLost,
            WindowEvent::Occluded(occluded) => InputEvent::VisibilityChanged { visible: !occluded },
            _ => return,
        };
        self.scene.handle_event(&input);
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.render_state
            .resize(&self.gpu.device, &self.gpu.surface, new_size.width, new_size.height);
        self.scene.resize(new_size.width, new_size.height);
    }

    /// Returns false when rendering cannot continue
    fn redraw(&mut self) -> bool {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        let fps = self.fps.tick(dt);

        self.scene.tick(dt);
        self.render_state.update_camera(&self.gpu.queue, self.scene.camera());

        let pointer = self.scene.cursor_pointer();
        if pointer != self.cursor_pointer {
            self.cursor_pointer = pointer;
            self.window
                .set_cursor(if pointer { CursorIcon::Pointer } else { CursorIcon::Default });
        }

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let scale = self.window.scale_factor() as f32;
        let output = ui::build_ui(&self.egui_ctx, raw_input, &self.scene, fps, 1.0 / scale);
        self.egui_state
            .handle_platform_output(&self.window, output.platform_output);
        let ui_frame = UiFrame {
            primitives: self.egui_ctx.tessellate(output.shapes, output.pixels_per_point),
            textures_delta: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        };

        let mesh = self.scene.build_mesh();
        match self.render_state.draw_frame(
            &self.gpu.device,
            &self.gpu.queue,
            &self.gpu.surface,
            &mesh,
            Some(ui_frame),
        ) {
            Ok(()) => true,
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory");
                false
            }
            Err(e) => {
                warn!(error = %e, "frame skipped");
                true
            }
        }
    }
}

/// DOM-style key name, so native and web share one set of bindings
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(named) => Some(format!("{named:?}")),
        _ => None,
    }
}

#[derive(Default)]
struct Gallery {
    app: Option<App>,
    error: Option<GalleryError>,
}

impl ApplicationHandler for Gallery {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match App::new(event_loop) {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else { return };
        if window_id != app.window.id() {
            return;
        }

        // First let egui process the event
        let egui_consumed = app.egui_state.on_window_event(&app.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => app.resize(size),
            WindowEvent::RedrawRequested => {
                if !app.redraw() {
                    event_loop.exit();
                }
            }
            other => app.input(&other, egui_consumed),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.app {
            app.window.request_redraw();
        }
    }
}

fn main() -> ExitCode {
    logging::init();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!(error = %e, "failed to create event loop");
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut gallery = Gallery::default();
    if let Err(e) = event_loop.run_app(&mut gallery) {
        error!(error = %e, "event loop failed");
        return ExitCode::FAILURE;
    }

    match gallery.error {
        Some(e) => {
            error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
