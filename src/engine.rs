//! The gesture engine: event handlers, click/drag disambiguation, and the
//! actions emitted back to the host.
//!
//! [`EngineCore`] owns the viewport controller, the node mirror, and the
//! gesture state machine, and contains no browser types; everything here is
//! exercised by native unit tests. Handlers take the neutral event records
//! from [`crate::input`] with element-relative CSS-pixel coordinates and
//! return the batch of [`Action`]s the host must apply. The browser wrapper
//! lives in [`crate::web`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use log::{debug, trace};

use crate::consts::{CLICK_DRAG_THRESHOLD_PX, MIN_PINCH_DISTANCE_PX, WHEEL_ZOOM_SENSITIVITY, ZOOM_TO_FIT_PADDING_PX};
use crate::grid;
use crate::input::{
    Button, DragSession, GestureState, PanSession, PinchSession, TouchPoint, WheelDelta,
    two_touch_geometry,
};
use crate::node::{CanvasNode, NodeId, NodeStore};
use crate::viewport::{Point, Viewport, ViewportConfig, ViewportController};

/// Mouse cursor derived from the gesture state. The engine emits cursor
/// changes as actions; it never reads styling back to infer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Grab,
    Grabbing,
}

impl Cursor {
    /// The CSS `cursor` property value for this cursor.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
        }
    }
}

/// Actions returned from event handlers for the host to process.
///
/// Positions are canvas-space. Drag positions arrive already snapped when
/// snap-to-grid is enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// A node drag passed the click threshold. Fired exactly once per drag.
    NodeDragStart { id: NodeId },
    /// The dragged node's proposed new position.
    NodeDragMove { id: NodeId, position: Point },
    /// The drag ended; the host commits the final position it last saw.
    NodeDragStop { id: NodeId },
    /// Press and release on a node without exceeding the click threshold.
    NodeClick { id: NodeId, position: Point },
    /// Press and release on empty canvas without exceeding the threshold.
    CanvasClick { position: Point },
    /// Context-menu request at a canvas position.
    ContextMenu { position: Point },
    /// Pan or zoom changed the viewport; the host should re-render.
    ViewportChanged,
    /// The host should restyle the mouse cursor.
    SetCursor(Cursor),
}

/// Core engine state — all logic that doesn't depend on the canvas element.
///
/// Separated from [`crate::web::Engine`] so it can be tested without
/// WASM/browser dependencies.
#[derive(Debug, Default)]
pub struct EngineCore {
    nodes: NodeStore,
    controller: ViewportController,
    gesture: GestureState,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a custom (sanitized) configuration.
    #[must_use]
    pub fn with_config(config: ViewportConfig) -> Self {
        Self {
            nodes: NodeStore::new(),
            controller: ViewportController::with_config(config),
            gesture: GestureState::Idle,
        }
    }

    // --- Host data sync ---

    /// Replace the node mirror with a fresh snapshot from the host model.
    pub fn load_nodes(&mut self, nodes: Vec<CanvasNode>) {
        self.nodes.load_snapshot(nodes);
    }

    /// Insert or update a single mirrored node.
    pub fn upsert_node(&mut self, node: CanvasNode) {
        self.nodes.upsert(node);
    }

    /// Remove a mirrored node. An in-flight drag of that node degrades to
    /// no-ops rather than erroring; deletion mid-drag is a legitimate host
    /// event.
    pub fn remove_node(&mut self, id: &NodeId) {
        self.nodes.remove(id);
    }

    // --- Queries ---

    /// The current viewport state.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.controller.viewport()
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> ViewportConfig {
        self.controller.config()
    }

    /// The current gesture state.
    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// The cursor implied by the current gesture state.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        match self.gesture {
            GestureState::Idle | GestureState::Pinching(_) => Cursor::Default,
            GestureState::ArmedNodeDrag(_) | GestureState::ArmedPan(_) => Cursor::Grab,
            GestureState::DraggingNode(_) | GestureState::Panning(_) => Cursor::Grabbing,
        }
    }

    /// Look up a mirrored node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&CanvasNode> {
        self.nodes.get(id)
    }

    /// Number of mirrored nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Convert a client-space coordinate to canvas space given the canvas
    /// element's bounding-box offset. For hosts placing new content at a
    /// click position.
    #[must_use]
    pub fn transform_coordinates(
        &self,
        client_x: f64,
        client_y: f64,
        rect_left: f64,
        rect_top: f64,
    ) -> Point {
        self.viewport()
            .screen_to_canvas(Point::new(client_x - rect_left, client_y - rect_top))
    }

    // --- Viewport affordances (buttons, shortcuts) ---

    /// Translate the view by a screen-space delta.
    pub fn pan(&mut self, delta_x: f64, delta_y: f64) {
        self.controller.pan(delta_x, delta_y);
    }

    /// Set the zoom level, clamped, optionally anchored at a screen point.
    pub fn zoom_to(&mut self, zoom: f64, anchor: Option<Point>) {
        self.controller.zoom_to(zoom, anchor);
    }

    /// Step the zoom up, optionally anchored.
    pub fn zoom_in(&mut self, anchor: Option<Point>) {
        self.controller.zoom_in(anchor);
    }

    /// Step the zoom down, optionally anchored.
    pub fn zoom_out(&mut self, anchor: Option<Point>) {
        self.controller.zoom_out(anchor);
    }

    /// Fit every mirrored node into the given view dimensions.
    pub fn zoom_to_fit(&mut self, viewport_width: f64, viewport_height: f64) {
        let nodes = self.nodes.all();
        self.controller
            .zoom_to_fit(&nodes, viewport_width, viewport_height, ZOOM_TO_FIT_PADDING_PX);
    }

    /// Reset to the identity viewport.
    pub fn reset_viewport(&mut self) {
        self.controller.reset();
    }

    /// Replace the configuration; the current zoom is re-clamped into the
    /// new bounds immediately.
    pub fn set_config(&mut self, config: ViewportConfig) {
        self.controller.set_config(config);
    }

    // --- Pointer events ---

    /// Pointer pressed at `point` (element-relative). `hit` names the node
    /// under the pointer, if the host resolved one from the event target.
    /// The primary button arms a drag or pan depending on the hit; the
    /// middle button always arms a pan; the secondary button starts nothing
    /// (context menus arrive through [`Self::on_context_menu`]).
    ///
    /// A press while another session is live silently aborts the old
    /// session first; the stale gesture gets no stop or click actions.
    pub fn on_pointer_down(&mut self, point: Point, button: Button, hit: Option<NodeId>) -> Vec<Action> {
        if !point.is_finite() {
            trace!("pointer-down with non-finite coordinates ignored");
            return Vec::new();
        }
        if button == Button::Secondary {
            return Vec::new();
        }
        if !self.gesture.is_idle() {
            trace!("pointer-down during live gesture; aborting stale session");
            self.gesture = GestureState::Idle;
        }

        let hit = if button == Button::Middle { None } else { hit };
        match hit.and_then(|id| self.nodes.get(&id).copied()) {
            Some(node) => {
                let grabbed = self.viewport().screen_to_canvas(point);
                self.gesture = GestureState::ArmedNodeDrag(DragSession {
                    node_id: node.id,
                    grab_offset: Point::new(grabbed.x - node.x, grabbed.y - node.y),
                    press_screen: point,
                    last_screen: point,
                });
            }
            None => {
                self.gesture = GestureState::ArmedPan(PanSession {
                    press_screen: point,
                    last_screen: point,
                });
            }
        }
        Vec::new()
    }

    /// Pointer moved to `point` (element-relative).
    pub fn on_pointer_move(&mut self, point: Point) -> Vec<Action> {
        if !point.is_finite() {
            trace!("pointer-move with non-finite coordinates ignored");
            return Vec::new();
        }
        match self.gesture {
            GestureState::Idle | GestureState::Pinching(_) => Vec::new(),
            GestureState::ArmedNodeDrag(mut session) => {
                if !past_threshold(session.press_screen, point) {
                    session.last_screen = point;
                    self.gesture = GestureState::ArmedNodeDrag(session);
                    return Vec::new();
                }
                debug!("node drag confirmed: {}", session.node_id);
                self.gesture = GestureState::DraggingNode(session);
                let mut actions = vec![
                    Action::NodeDragStart { id: session.node_id },
                    Action::SetCursor(Cursor::Grabbing),
                ];
                actions.extend(self.drag_move(point));
                actions
            }
            GestureState::DraggingNode(_) => self.drag_move(point),
            GestureState::ArmedPan(mut session) => {
                if !past_threshold(session.press_screen, point) {
                    session.last_screen = point;
                    self.gesture = GestureState::ArmedPan(session);
                    return Vec::new();
                }
                debug!("pan confirmed");
                self.gesture = GestureState::Panning(session);
                let mut actions = vec![Action::SetCursor(Cursor::Grabbing)];
                actions.extend(self.pan_move(point));
                actions
            }
            GestureState::Panning(_) => self.pan_move(point),
        }
    }

    /// Pointer released at `point`. A release from an armed state is a
    /// click; from a confirmed state it ends the gesture.
    pub fn on_pointer_up(&mut self, point: Point) -> Vec<Action> {
        let state = self.gesture;
        self.gesture = match state {
            GestureState::Pinching(_) => state,
            _ => GestureState::Idle,
        };
        match state {
            GestureState::Idle | GestureState::Pinching(_) => Vec::new(),
            GestureState::ArmedNodeDrag(session) => {
                let release = finite_or(point, session.last_screen);
                if self.nodes.contains(&session.node_id) {
                    vec![Action::NodeClick {
                        id: session.node_id,
                        position: self.viewport().screen_to_canvas(release),
                    }]
                } else {
                    trace!("click on removed node {} dropped", session.node_id);
                    Vec::new()
                }
            }
            GestureState::DraggingNode(session) => {
                let mut actions = Vec::new();
                if self.nodes.contains(&session.node_id) {
                    actions.push(Action::NodeDragStop { id: session.node_id });
                } else {
                    trace!("drag-stop for removed node {} dropped", session.node_id);
                }
                actions.push(Action::SetCursor(Cursor::Default));
                actions
            }
            GestureState::ArmedPan(session) => {
                let release = finite_or(point, session.last_screen);
                vec![Action::CanvasClick {
                    position: self.viewport().screen_to_canvas(release),
                }]
            }
            GestureState::Panning(_) => vec![Action::SetCursor(Cursor::Default)],
        }
    }

    /// Pointer cancelled (browser-initiated interruption): abort silently.
    /// No click and no stop action is fired; only the cursor is restored.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        let was_confirmed = self.gesture.is_confirmed();
        self.gesture = GestureState::Idle;
        if was_confirmed {
            vec![Action::SetCursor(Cursor::Default)]
        } else {
            Vec::new()
        }
    }

    /// Wheel scrolled at `point`: exponential zoom anchored at the cursor.
    /// Small ticks compound multiplicatively; large ticks don't overshoot.
    pub fn on_wheel(&mut self, point: Point, delta: WheelDelta) -> Vec<Action> {
        if !point.is_finite() || !delta.dy.is_finite() {
            trace!("wheel with non-finite input ignored");
            return Vec::new();
        }
        let factor = (-delta.dy * WHEEL_ZOOM_SENSITIVITY).exp();
        let zoom = self.viewport().zoom;
        self.controller.zoom_to(zoom * factor, Some(point));
        vec![Action::ViewportChanged]
    }

    /// Context-menu request at `point` (element-relative).
    pub fn on_context_menu(&mut self, point: Point) -> Vec<Action> {
        if !point.is_finite() {
            return Vec::new();
        }
        vec![Action::ContextMenu {
            position: self.viewport().screen_to_canvas(point),
        }]
    }

    // --- Touch events ---

    /// Touches began; `touches` is the full current touch list (mirrors
    /// `TouchEvent.touches`). One touch behaves like a pointer-down; a
    /// second touch cancels any single-pointer session silently and starts
    /// a pinch.
    pub fn on_touch_start(&mut self, touches: &[TouchPoint], hit: Option<NodeId>) -> Vec<Action> {
        match touches {
            [] => Vec::new(),
            [only] => self.on_pointer_down(only.position, Button::Primary, hit),
            _ => {
                let was_confirmed = self.gesture.is_confirmed();
                match two_touch_geometry(touches) {
                    Some((midpoint, distance)) => {
                        debug!("pinch started at distance {distance:.1}px");
                        self.gesture = GestureState::Pinching(PinchSession {
                            last_distance: distance,
                            last_midpoint: midpoint,
                        });
                    }
                    None => self.gesture = GestureState::Idle,
                }
                if was_confirmed {
                    vec![Action::SetCursor(Cursor::Default)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Touches moved. While pinching, the incremental distance ratio drives
    /// an anchored zoom at the midpoint; the session is re-baselined every
    /// event so scale errors don't accumulate.
    pub fn on_touch_move(&mut self, touches: &[TouchPoint]) -> Vec<Action> {
        match self.gesture {
            GestureState::Pinching(session) => {
                let Some((midpoint, distance)) = two_touch_geometry(touches) else {
                    return Vec::new();
                };
                let mut actions = Vec::new();
                if session.last_distance >= MIN_PINCH_DISTANCE_PX
                    && distance >= MIN_PINCH_DISTANCE_PX
                {
                    let scale = distance / session.last_distance;
                    let zoom = self.viewport().zoom;
                    self.controller.zoom_to(zoom * scale, Some(midpoint));
                    actions.push(Action::ViewportChanged);
                }
                self.gesture = GestureState::Pinching(PinchSession {
                    last_distance: distance,
                    last_midpoint: midpoint,
                });
                actions
            }
            GestureState::Idle => Vec::new(),
            _ => match touches.first() {
                Some(touch) => self.on_pointer_move(touch.position),
                None => Vec::new(),
            },
        }
    }

    /// Touches ended; `remaining` is the touch list after the lift. A pinch
    /// survives while two touches remain, otherwise the machine returns to
    /// idle; a single-touch session releases at its last observed position.
    pub fn on_touch_end(&mut self, remaining: &[TouchPoint]) -> Vec<Action> {
        match self.gesture {
            GestureState::Idle => Vec::new(),
            GestureState::Pinching(_) => {
                match two_touch_geometry(remaining) {
                    Some((midpoint, distance)) => {
                        // Identifiers may have changed; re-baseline.
                        self.gesture = GestureState::Pinching(PinchSession {
                            last_distance: distance,
                            last_midpoint: midpoint,
                        });
                    }
                    None => {
                        debug!("pinch ended");
                        self.gesture = GestureState::Idle;
                    }
                }
                Vec::new()
            }
            GestureState::ArmedNodeDrag(session) | GestureState::DraggingNode(session) => {
                if remaining.is_empty() {
                    self.on_pointer_up(session.last_screen)
                } else {
                    trace!("touch-end for unknown identifier ignored");
                    Vec::new()
                }
            }
            GestureState::ArmedPan(session) | GestureState::Panning(session) => {
                if remaining.is_empty() {
                    self.on_pointer_up(session.last_screen)
                } else {
                    trace!("touch-end for unknown identifier ignored");
                    Vec::new()
                }
            }
        }
    }

    /// Touch sequence cancelled: abort silently, identical to
    /// [`Self::on_pointer_cancel`].
    pub fn on_touch_cancel(&mut self) -> Vec<Action> {
        self.on_pointer_cancel()
    }

    // --- Gesture internals ---

    fn drag_move(&mut self, point: Point) -> Vec<Action> {
        let GestureState::DraggingNode(mut session) = self.gesture else {
            return Vec::new();
        };
        session.last_screen = point;
        self.gesture = GestureState::DraggingNode(session);

        if !self.nodes.contains(&session.node_id) {
            trace!("drag-move for removed node {} dropped", session.node_id);
            return Vec::new();
        }
        let pointer_canvas = self.viewport().screen_to_canvas(point);
        let mut position = Point::new(
            pointer_canvas.x - session.grab_offset.x,
            pointer_canvas.y - session.grab_offset.y,
        );
        let config = self.config();
        if config.snap_to_grid {
            position = grid::snap_point(position, config.grid_size);
        }
        vec![Action::NodeDragMove { id: session.node_id, position }]
    }

    fn pan_move(&mut self, point: Point) -> Vec<Action> {
        let GestureState::Panning(mut session) = self.gesture else {
            return Vec::new();
        };
        let delta_x = point.x - session.last_screen.x;
        let delta_y = point.y - session.last_screen.y;
        session.last_screen = point;
        self.gesture = GestureState::Panning(session);
        self.controller.pan(delta_x, delta_y);
        vec![Action::ViewportChanged]
    }
}

/// Whether `current` has moved past the click/drag threshold from `press`.
fn past_threshold(press: Point, current: Point) -> bool {
    (current.x - press.x).hypot(current.y - press.y) >= CLICK_DRAG_THRESHOLD_PX
}

/// `point` when finite, otherwise `fallback` (the session's last observed
/// position).
fn finite_or(point: Point, fallback: Point) -> Point {
    if point.is_finite() { point } else { fallback }
}
