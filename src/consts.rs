//! Shared numeric constants for the flowcanvas crate.

// ── Gestures ────────────────────────────────────────────────────

/// Screen-space displacement (pixels) beyond which a pressed pointer
/// stops being a click candidate and becomes a drag or pan.
pub const CLICK_DRAG_THRESHOLD_PX: f64 = 5.0;

/// Exponent scale applied to wheel `delta_y` when deriving a zoom factor.
/// Wheel-up (negative delta) zooms in.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.001;

/// Two-finger distances below this (pixels) are too noisy to drive zoom.
pub const MIN_PINCH_DISTANCE_PX: f64 = 1.0;

// ── Viewport defaults ───────────────────────────────────────────

/// Lowest zoom factor the viewport may reach.
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

/// Highest zoom factor the viewport may reach.
pub const DEFAULT_MAX_ZOOM: f64 = 4.0;

/// Additive step used by the zoom-in / zoom-out affordances.
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;

/// Screen-space padding kept around the content when fitting it to view.
pub const ZOOM_TO_FIT_PADDING_PX: f64 = 50.0;

// ── Grid ────────────────────────────────────────────────────────

/// Default spacing between grid intersections, in canvas units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

// ── Nodes ───────────────────────────────────────────────────────

/// Width assumed for a node that does not report one.
pub const DEFAULT_NODE_WIDTH: f64 = 150.0;

/// Height assumed for a node that does not report one.
pub const DEFAULT_NODE_HEIGHT: f64 = 50.0;
