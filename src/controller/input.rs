/// Platform-agnostic input handling system
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::{Rc, Weak};

use glam::Vec2;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Pointer events, screen coordinates in logical pixels
    Pointer(PointerEvent),

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Cancel,
    Move { x: f32, y: f32 },
}

/// Pressed keys and last known pointer position
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub pointer_pos: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(key.clone());
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key.as_str());
            }
            InputEvent::Pointer(PointerEvent::Down { x, y })
            | InputEvent::Pointer(PointerEvent::Up { x, y })
            | InputEvent::Pointer(PointerEvent::Move { x, y }) => {
                self.pointer_pos = Some(Vec2::new(*x, *y));
            }
            InputEvent::Pointer(PointerEvent::Cancel) => {}
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear_keys();
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }
}

/// Key mapping configuration. Each action accepts any of its keys.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: keys(&["ArrowUp", "w", "W"]),
            backward: keys(&["ArrowDown", "s", "S"]),
            left: keys(&["ArrowLeft", "a", "A"]),
            right: keys(&["ArrowRight", "d", "D"]),
            jump: keys(&[" ", "Space"]),
        }
    }
}

/// The five named actions, polled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// High-level input processor
#[derive(Clone, Debug, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    fn any_pressed(input: &InputState, keys: &[String]) -> bool {
        keys.iter().any(|k| input.is_key_pressed(k))
    }

    pub fn poll(&self, input: &InputState) -> Actions {
        Actions {
            forward: Self::any_pressed(input, &self.bindings.forward),
            backward: Self::any_pressed(input, &self.bindings.backward),
            left: Self::any_pressed(input, &self.bindings.left),
            right: Self::any_pressed(input, &self.bindings.right),
            jump: Self::any_pressed(input, &self.bindings.jump),
        }
    }

    /// Keys the page should not scroll on
    pub fn is_navigation_key(&self, key: &str) -> bool {
        [
            &self.bindings.forward,
            &self.bindings.backward,
            &self.bindings.left,
            &self.bindings.right,
            &self.bindings.jump,
        ]
        .iter()
        .any(|list| list.iter().any(|k| k == key))
    }
}

/// Drag tracking fed by document-level pointer events
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDrag {
    pub active: bool,
    pub start: Vec2,
}

impl PointerDrag {
    pub fn handle(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down { x, y } => {
                self.active = true;
                self.start = Vec2::new(x, y);
            }
            PointerEvent::Up { .. } | PointerEvent::Cancel => {
                self.active = false;
            }
            PointerEvent::Move { .. } => {}
        }
    }
}

type Listener = Box<dyn FnMut(&PointerEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

/// Document-level pointer event source.
///
/// Listeners are registered with [`PointerHub::listen`] and stay attached
/// exactly as long as the returned guard lives.
#[derive(Clone, Default)]
pub struct PointerHub {
    listeners: Rc<RefCell<Listeners>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the listener is removed as soon as the guard is dropped"]
    pub fn listen(&self, listener: impl FnMut(&PointerEvent) + 'static) -> PointerListenerGuard {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Box::new(listener));
        PointerListenerGuard {
            listeners: Rc::downgrade(&self.listeners),
            id,
        }
    }

    pub fn dispatch(&self, event: &PointerEvent) {
        for listener in self.listeners.borrow_mut().entries.values_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// Keeps one listener attached to a [`PointerHub`]; detaches on drop
pub struct PointerListenerGuard {
    listeners: Weak<RefCell<Listeners>>,
    id: u64,
}

impl Drop for PointerListenerGuard {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().entries.remove(&self.id);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, PointerEvent as DomPointerEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn pointer_event_to_input(e: &DomPointerEvent, kind: &str) -> Option<PointerEvent> {
        let x = e.client_x() as f32;
        let y = e.client_y() as f32;
        match kind {
            "pointerdown" => Some(PointerEvent::Down { x, y }),
            "pointerup" => Some(PointerEvent::Up { x, y }),
            "pointercancel" => Some(PointerEvent::Cancel),
            "pointermove" => Some(PointerEvent::Move { x, y }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings_poll() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("ArrowUp".into()));
        input.process_event(&InputEvent::KeyDown("D".into()));
        input.process_event(&InputEvent::KeyDown(" ".into()));
        assert_eq!(
            processor.poll(&input),
            Actions { forward: true, right: true, jump: true, ..Default::default() }
        );
        input.process_event(&InputEvent::KeyUp("ArrowUp".into()));
        assert!(!processor.poll(&input).forward);
    }

    #[test]
    fn test_focus_lost_releases_keys() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("w".into()));
        input.process_event(&InputEvent::FocusLost);
        assert_eq!(processor.poll(&input), Actions::default());
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut drag = PointerDrag::default();
        drag.handle(&PointerEvent::Down { x: 10.0, y: 20.0 });
        assert!(drag.active);
        assert_eq!(drag.start, Vec2::new(10.0, 20.0));
        drag.handle(&PointerEvent::Move { x: 50.0, y: 50.0 });
        assert_eq!(drag.start, Vec2::new(10.0, 20.0));
        drag.handle(&PointerEvent::Cancel);
        assert!(!drag.active);
        drag.handle(&PointerEvent::Down { x: 1.0, y: 2.0 });
        drag.handle(&PointerEvent::Up { x: 1.0, y: 2.0 });
        assert!(!drag.active);
    }

    #[test]
    fn test_guard_detaches_listener() {
        let hub = PointerHub::new();
        let hits = Rc::new(RefCell::new(0));
        let guard = {
            let hits = hits.clone();
            hub.listen(move |_| *hits.borrow_mut() += 1)
        };
        hub.dispatch(&PointerEvent::Cancel);
        assert_eq!(hub.listener_count(), 1);
        drop(guard);
        hub.dispatch(&PointerEvent::Cancel);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_guard_outliving_hub_is_harmless() {
        let hub = PointerHub::new();
        let guard = hub.listen(|_| {});
        drop(hub);
        drop(guard);
    }
}
