// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod scene;
pub mod ui;
pub mod utils;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod frame_loop;

pub use error::{GalleryError, Result};
pub use scene::Scene;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing::{error, info};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, Window};

    use crate::controller::input::wasm::{keyboard_event_to_input, pointer_event_to_input};
    use crate::controller::input::{InputEvent, PointerEvent};
    use crate::error::GalleryError;
    use crate::frame_loop::FrameLoopContext;
    use crate::scene::Scene;
    use crate::view::{GpuContext, RenderState};
    use crate::logging;

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let (window, document, canvas) = init_canvas()?;
        setup_app(window, document, canvas).await
    }

    /// Main application setup for WASM
    async fn setup_app(window: Window, document: Document, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let gpu = GpuContext::new(&canvas, canvas.width(), canvas.height())
            .await
            .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

        let (css_w, css_h) = css_size(&window);
        let location = window.location().pathname().unwrap_or_else(|_| "/".to_string());
        let scene = Rc::new(RefCell::new(Scene::with_location(css_w, css_h, &location)));

        let render_state = RenderState::new(
            &gpu.device,
            &gpu.queue,
            gpu.format,
            gpu.config.alpha_mode,
            gpu.config.width,
            gpu.config.height,
            &Scene::ground_mesh(),
        );

        let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));
        let listeners = DocumentListeners::attach(&window, &document, scene.clone(), egui_events.clone())?;

        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        let mut frame_ctx = FrameLoopContext::new(gpu, render_state, scene, canvas, egui_events, now);

        info!("gallery started");

        // Continuous redraw using requestAnimationFrame; the listeners live
        // exactly as long as the loop
        let f = RcCellCallback::new(window.clone(), {
            let window_for_loop = window.clone();
            move || {
                let _alive = &listeners;
                frame_ctx.frame(&window_for_loop);
            }
        });
        f.start();

        Ok(())
    }

    type Handler = Closure<dyn FnMut(Event)>;

    /// Document and window event listeners, removed again on drop
    pub struct DocumentListeners {
        entries: Vec<(EventTarget, &'static str, Handler)>,
    }

    impl DocumentListeners {
        fn new() -> Self {
            Self { entries: Vec::new() }
        }

        fn add(
            &mut self,
            target: &EventTarget,
            kind: &'static str,
            handler: impl FnMut(Event) + 'static,
        ) -> Result<(), JsValue> {
            let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
            target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            self.entries.push((target.clone(), kind, closure));
            Ok(())
        }

        /// Pointer, keyboard and focus listeners feeding the scene
        pub fn attach(
            window: &Window,
            document: &Document,
            scene: Rc<RefCell<Scene>>,
            egui_events: Rc<RefCell<Vec<egui::Event>>>,
        ) -> Result<Self, JsValue> {
            let mut listeners = Self::new();

            for kind in ["pointerdown", "pointerup", "pointercancel", "pointermove"] {
                let scene = scene.clone();
                let egui_events = egui_events.clone();
                listeners.add(document, kind, move |e: Event| {
                    let Some(pe) = e.dyn_ref::<web_sys::PointerEvent>() else { return };
                    let Some(pointer) = pointer_event_to_input(pe, kind) else { return };
                    egui_events.borrow_mut().extend(egui_pointer_event(&pointer));
                    scene.borrow_mut().handle_event(&InputEvent::Pointer(pointer));
                })?;
            }

            for (kind, is_down) in [("keydown", true), ("keyup", false)] {
                let scene = scene.clone();
                listeners.add(document, kind, move |e: Event| {
                    let Some(ke) = e.dyn_ref::<KeyboardEvent>() else { return };
                    let event = keyboard_event_to_input(ke, is_down);
                    let mut scene = scene.borrow_mut();
                    if scene.processor().is_navigation_key(&ke.key()) {
                        e.prevent_default();
                    }
                    scene.handle_event(&event);
                })?;
            }

            {
                let scene = scene.clone();
                listeners.add(window, "blur", move |_e: Event| {
                    scene.borrow_mut().handle_event(&InputEvent::FocusLost);
                })?;
            }

            {
                let document_for_visibility = document.clone();
                listeners.add(document, "visibilitychange", move |_e: Event| {
                    let visible = !document_for_visibility.hidden();
                    scene.borrow_mut().handle_event(&InputEvent::VisibilityChanged { visible });
                })?;
            }

            Ok(listeners)
        }
    }

    impl Drop for DocumentListeners {
        fn drop(&mut self) {
            for (target, kind, closure) in &self.entries {
                let _ = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            }
        }
    }

    fn egui_pointer_event(pointer: &PointerEvent) -> Option<egui::Event> {
        let button = |x: f32, y: f32, pressed: bool| egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        };
        match *pointer {
            PointerEvent::Move { x, y } => Some(egui::Event::PointerMoved(egui::pos2(x, y))),
            PointerEvent::Down { x, y } => Some(button(x, y, true)),
            PointerEvent::Up { x, y } => Some(button(x, y, false)),
            PointerEvent::Cancel => Some(egui::Event::PointerGone),
        }
    }

    fn css_size(window: &Window) -> (u32, u32) {
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
        (w as u32, h as u32)
    }

    fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
        let window = web_sys::window().ok_or_else(|| dom_error("window"))?;
        let document = window.document().ok_or_else(|| dom_error("document"))?;
        let body = document.body().ok_or_else(|| dom_error("body"))?;
        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| dom_error("canvas"))?;

        let (css_w, css_h) = css_size(&window);
        let dpr = window.device_pixel_ratio();
        canvas_el.set_width((css_w as f64 * dpr) as u32);
        canvas_el.set_height((css_h as f64 * dpr) as u32);
        let style = canvas_el.style();
        style.set_property("width", "100vw")?;
        style.set_property("height", "100vh")?;
        style.set_property("display", "block")?;
        style.set_property("touch-action", "none")?;
        body.append_child(&canvas_el)?;
        Ok((window, document, canvas_el))
    }

    fn dom_error(what: &'static str) -> JsValue {
        js_error(GalleryError::Dom(what).to_string())
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Recursively schedule next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        error!(error = ?e, "requestAnimationFrame failed, loop stopped");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    error!(error = ?e, "requestAnimationFrame failed, loop not started");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
