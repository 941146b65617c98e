//! Input model: neutral event records, gesture sessions, and the gesture
//! state machine.
//!
//! Raw DOM events are translated (by the host or by the [`crate::web`]
//! layer) into the framework-agnostic records here before they reach the
//! engine. `GestureState` is the single source of truth for what gesture is
//! in flight; each active variant carries the session struct holding the
//! context needed to compute incremental deltas. Cursor styling is derived
//! from this state by the engine, never the other way around.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::node::NodeId;
use crate::viewport::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// One active touch point, keyed by the browser's stable touch identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Per-touch identifier, stable for the lifetime of the touch.
    pub id: i32,
    /// Screen-space position (CSS pixels, element-relative).
    pub position: Point,
}

impl TouchPoint {
    #[must_use]
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self { id, position: Point::new(x, y) }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Context for a node drag, created on pointer-down over a node.
///
/// The grab offset is the canvas-space distance from the node's top-left
/// corner to the point that was grabbed, so the node does not jump under
/// the pointer when the drag confirms.
#[derive(Debug, Clone, Copy)]
pub struct DragSession {
    /// The node being (potentially) dragged.
    pub node_id: NodeId,
    /// Canvas-space offset from the node position to the grab point.
    pub grab_offset: Point,
    /// Screen-space position of the initiating pointer-down, for the
    /// click/drag threshold test.
    pub press_screen: Point,
    /// Screen-space position of the most recent pointer event.
    pub last_screen: Point,
}

/// Context for a canvas pan, created on pointer-down over empty canvas.
#[derive(Debug, Clone, Copy)]
pub struct PanSession {
    /// Screen-space position of the initiating pointer-down.
    pub press_screen: Point,
    /// Screen-space position of the previous event, for incremental deltas.
    pub last_screen: Point,
}

/// Context for a two-finger pinch. Exists only while exactly two touch
/// points are active; both fields are updated every move event so the zoom
/// is driven by incremental ratios rather than cumulative-from-start scale.
#[derive(Debug, Clone, Copy)]
pub struct PinchSession {
    /// Inter-touch distance (pixels) at the previous event.
    pub last_distance: f64,
    /// Screen-space midpoint of the two touches at the previous event.
    pub last_midpoint: Point,
}

/// The gesture state machine.
///
/// `Armed*` states mean the pointer is down but has not yet travelled past
/// the click/drag threshold; releasing from an armed state is a click.
/// Promotion to the confirmed state happens at most once per gesture and
/// fires the corresponding start action.
#[derive(Debug, Clone, Copy, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Pointer down on a node, movement still within the click threshold.
    ArmedNodeDrag(DragSession),
    /// Node drag confirmed; move events reposition the node.
    DraggingNode(DragSession),
    /// Pointer down on empty canvas, movement still within the threshold.
    ArmedPan(PanSession),
    /// Pan confirmed; move events translate the viewport.
    Panning(PanSession),
    /// Two touch points active; distance drives zoom, midpoint anchors it.
    Pinching(PinchSession),
}

impl GestureState {
    /// Whether no gesture is currently tracked.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a gesture has been confirmed (threshold exceeded or pinch).
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::DraggingNode(_) | Self::Panning(_) | Self::Pinching(_))
    }
}

/// Midpoint and distance of the first two touches, or `None` when fewer
/// than two are active.
#[must_use]
pub fn two_touch_geometry(touches: &[TouchPoint]) -> Option<(Point, f64)> {
    let a = touches.first()?;
    let b = touches.get(1)?;
    let midpoint = Point::new(
        (a.position.x + b.position.x) / 2.0,
        (a.position.y + b.position.y) / 2.0,
    );
    let distance = (b.position.x - a.position.x).hypot(b.position.y - a.position.y);
    Some((midpoint, distance))
}
