//! Browser binding: wraps the canvas element and owns DOM listener
//! lifecycle.
//!
//! [`Engine`] translates DOM events into the neutral records consumed by
//! [`EngineCore`](crate::engine::EngineCore) (element-relative CSS-pixel
//! coordinates via `getBoundingClientRect`) and forwards the resulting
//! action batches to a host-provided sink. Release-type events
//! (`pointerup`, `pointercancel`, `touchend`, `touchcancel`) are observed
//! at window scope so a gesture that ends outside the canvas element still
//! clears state: those listeners are registered in [`Engine::mount`] and
//! removed again when the engine is dropped.
//!
//! Cursor styling is applied here as a derived effect of the emitted
//! [`Action::SetCursor`] values; nothing ever reads styling back.

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, HtmlCanvasElement, MouseEvent, PointerEvent, TouchEvent, WheelEvent};

use crate::engine::{Action, EngineCore};
use crate::input::{Button, TouchPoint, WheelDelta};
use crate::node::{CanvasNode, NodeId};
use crate::viewport::Point;

/// Host callback receiving each batch of actions an event produced.
pub type ActionSink = Rc<dyn Fn(&[Action])>;

/// The full canvas engine. Wraps [`EngineCore`] and owns the browser canvas
/// element plus the window-scoped release listeners.
pub struct Engine {
    canvas: HtmlCanvasElement,
    core: Rc<RefCell<EngineCore>>,
    sink: ActionSink,
    release_listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl Engine {
    /// Create a new engine bound to the given canvas element. Call
    /// [`Self::mount`] afterwards to start observing releases at window
    /// scope.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, sink: ActionSink) -> Self {
        Self {
            canvas,
            core: Rc::new(RefCell::new(EngineCore::new())),
            sink,
            release_listeners: Vec::new(),
        }
    }

    /// Shared handle to the core, for host data sync (node snapshots,
    /// config changes) and viewport affordances.
    #[must_use]
    pub fn core(&self) -> Rc<RefCell<EngineCore>> {
        Rc::clone(&self.core)
    }

    /// Register the window-level release listeners. Idempotent: mounting an
    /// already-mounted engine re-registers nothing.
    pub fn mount(&mut self) {
        if !self.release_listeners.is_empty() {
            return;
        }
        let Some(window) = web_sys::window() else {
            warn!("no window object; release listeners not registered");
            return;
        };

        let listeners: [(&'static str, Closure<dyn FnMut(Event)>); 4] = [
            ("pointerup", self.release_closure(ReleaseKind::PointerUp)),
            ("pointercancel", self.release_closure(ReleaseKind::Cancel)),
            ("touchend", self.release_closure(ReleaseKind::TouchEnd)),
            ("touchcancel", self.release_closure(ReleaseKind::Cancel)),
        ];
        for (name, closure) in listeners {
            if window
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .is_err()
            {
                warn!("failed to register window {name} listener");
            }
            self.release_listeners.push((name, closure));
        }
    }

    /// Remove the window-level release listeners. Called automatically on
    /// drop; exposed for hosts that detach the canvas before dropping.
    pub fn unmount(&mut self) {
        let Some(window) = web_sys::window() else {
            self.release_listeners.clear();
            return;
        };
        for (name, closure) in self.release_listeners.drain(..) {
            if window
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .is_err()
            {
                warn!("failed to remove window {name} listener");
            }
        }
    }

    /// Replace the node mirror from a JSON array of node records, as the
    /// host model serializes them. A malformed snapshot is rejected whole;
    /// the previous mirror stays in place.
    pub fn load_nodes_json(&self, json: &str) {
        match serde_json::from_str::<Vec<CanvasNode>>(json) {
            Ok(nodes) => self.core.borrow_mut().load_nodes(nodes),
            Err(err) => warn!("node snapshot rejected: {err}"),
        }
    }

    // --- Canvas-scoped event entry points (wired by the host) ---

    /// `pointerdown` on the canvas. `hit` names the node resolved from the
    /// event target, if any.
    pub fn on_pointer_down(&self, event: &PointerEvent, hit: Option<NodeId>) {
        let point = self.relative_point(event);
        let button = match event.button() {
            1 => Button::Middle,
            2 => Button::Secondary,
            _ => Button::Primary,
        };
        let actions = self.core.borrow_mut().on_pointer_down(point, button, hit);
        self.emit(&actions);
    }

    /// `pointermove` on the canvas.
    pub fn on_pointer_move(&self, event: &PointerEvent) {
        let point = self.relative_point(event);
        let actions = self.core.borrow_mut().on_pointer_move(point);
        self.emit(&actions);
    }

    /// `wheel` on the canvas: anchored exponential zoom at the cursor.
    pub fn on_wheel(&self, event: &WheelEvent) {
        let point = self.relative_point(event);
        let delta = WheelDelta { dx: event.delta_x(), dy: event.delta_y() };
        let actions = self.core.borrow_mut().on_wheel(point, delta);
        self.emit(&actions);
    }

    /// `contextmenu` on the canvas.
    pub fn on_context_menu(&self, event: &MouseEvent) {
        let point = self.relative_point(event);
        let actions = self.core.borrow_mut().on_context_menu(point);
        self.emit(&actions);
    }

    /// `touchstart` on the canvas.
    pub fn on_touch_start(&self, event: &TouchEvent, hit: Option<NodeId>) {
        let touches = self.touch_points(event);
        let actions = self.core.borrow_mut().on_touch_start(&touches, hit);
        self.emit(&actions);
    }

    /// `touchmove` on the canvas.
    pub fn on_touch_move(&self, event: &TouchEvent) {
        let touches = self.touch_points(event);
        let actions = self.core.borrow_mut().on_touch_move(&touches);
        self.emit(&actions);
    }

    // --- Internals ---

    fn release_closure(&self, kind: ReleaseKind) -> Closure<dyn FnMut(Event)> {
        let core = Rc::clone(&self.core);
        let sink = Rc::clone(&self.sink);
        let canvas = self.canvas.clone();
        Closure::new(move |event: Event| {
            let actions = match kind {
                ReleaseKind::PointerUp => {
                    let point = event
                        .dyn_ref::<PointerEvent>()
                        .map_or(Point::new(f64::NAN, f64::NAN), |ev| {
                            relative_to(&canvas, ev.client_x(), ev.client_y())
                        });
                    core.borrow_mut().on_pointer_up(point)
                }
                ReleaseKind::TouchEnd => {
                    let remaining = event
                        .dyn_ref::<TouchEvent>()
                        .map_or_else(Vec::new, |ev| remaining_touches(&canvas, ev));
                    core.borrow_mut().on_touch_end(&remaining)
                }
                ReleaseKind::Cancel => core.borrow_mut().on_pointer_cancel(),
            };
            apply_cursor(&canvas, &actions);
            sink(&actions);
        })
    }

    fn emit(&self, actions: &[Action]) {
        apply_cursor(&self.canvas, actions);
        (self.sink)(actions);
    }

    fn relative_point(&self, event: &MouseEvent) -> Point {
        relative_to(&self.canvas, event.client_x(), event.client_y())
    }

    fn touch_points(&self, event: &TouchEvent) -> Vec<TouchPoint> {
        remaining_touches(&self.canvas, event)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Which release-type DOM event a window closure serves.
#[derive(Clone, Copy)]
enum ReleaseKind {
    PointerUp,
    TouchEnd,
    Cancel,
}

/// Client coordinates made element-relative via the bounding rect.
fn relative_to(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Point {
    let rect = canvas.get_bounding_client_rect();
    Point::new(f64::from(client_x) - rect.left(), f64::from(client_y) - rect.top())
}

/// The event's current touch list as element-relative neutral records.
fn remaining_touches(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Vec<TouchPoint> {
    let list = event.touches();
    let mut touches = Vec::with_capacity(list.length() as usize);
    for index in 0..list.length() {
        if let Some(touch) = list.get(index) {
            let point = relative_to(canvas, touch.client_x(), touch.client_y());
            touches.push(TouchPoint { id: touch.identifier(), position: point });
        }
    }
    touches
}

/// Apply any cursor change in the batch to the canvas element's style.
fn apply_cursor(canvas: &HtmlCanvasElement, actions: &[Action]) {
    for action in actions {
        if let Action::SetCursor(cursor) = action {
            if canvas.style().set_property("cursor", cursor.as_css()).is_err() {
                warn!("failed to set canvas cursor");
            }
        }
    }
}
