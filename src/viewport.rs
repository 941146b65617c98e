//! Viewport state and coordinate conversions.
//!
//! The viewport maps canvas-space content onto screen pixels: `x` / `y` are
//! the screen-space translation of the canvas origin and `zoom` is a positive
//! scale factor. [`ViewportController`] is the only writer of that state; it
//! clamps every zoom request into the configured bounds and solves for the
//! pan offset that keeps an anchor point visually stationary across a zoom
//! change. The renderer and the gesture engine read the state through
//! [`Viewport`]'s conversion methods.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GRID_SIZE, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM_STEP};
use crate::node::CanvasNode;

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite (not NaN, not infinite).
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Pan/zoom state for the infinite canvas.
///
/// `x` / `y` are in CSS pixels. `zoom` is a scale factor (1.0 = 100%).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    /// Convert a screen-space point (CSS pixels, element-relative) to canvas
    /// coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.x) / self.zoom,
            y: (screen.y - self.y) / self.zoom,
        }
    }

    /// Convert a canvas-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point {
            x: canvas.x * self.zoom + self.x,
            y: canvas.y * self.zoom + self.y,
        }
    }

    /// Convert a screen-space distance (pixels) to canvas-space distance.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }
}

/// Engine configuration, settable by the host at init or at runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Lower zoom bound. Always `> 0` and `<= max_zoom` after sanitizing.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Additive step for the zoom-in / zoom-out affordances.
    pub zoom_step: f64,
    /// Spacing between grid intersections, in canvas units.
    pub grid_size: f64,
    /// Whether dragged nodes snap to the nearest grid intersection.
    pub snap_to_grid: bool,
    /// Whether the host should draw the grid. Read-through for the renderer;
    /// the engine itself never consults it.
    pub show_grid: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            grid_size: DEFAULT_GRID_SIZE,
            snap_to_grid: true,
            show_grid: true,
        }
    }
}

impl ViewportConfig {
    /// Return a copy with every numeric field forced into a usable range.
    ///
    /// Non-finite or non-positive bounds fall back to the defaults, and
    /// `min_zoom <= max_zoom` is restored by swapping if violated.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !self.min_zoom.is_finite() || self.min_zoom <= 0.0 {
            self.min_zoom = DEFAULT_MIN_ZOOM;
        }
        if !self.max_zoom.is_finite() || self.max_zoom <= 0.0 {
            self.max_zoom = DEFAULT_MAX_ZOOM;
        }
        if self.min_zoom > self.max_zoom {
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 {
            self.zoom_step = DEFAULT_ZOOM_STEP;
        }
        if !self.grid_size.is_finite() {
            self.grid_size = DEFAULT_GRID_SIZE;
        }
        self
    }
}

/// Owner of the viewport state.
///
/// All mutation goes through this type so that `zoom` can never leave the
/// configured bounds and never reaches the conversion math as zero, NaN, or
/// infinity.
#[derive(Debug, Clone)]
pub struct ViewportController {
    viewport: Viewport,
    config: ViewportConfig,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    /// Identity viewport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ViewportConfig::default())
    }

    /// Identity viewport with the given (sanitized) configuration.
    #[must_use]
    pub fn with_config(config: ViewportConfig) -> Self {
        let config = config.sanitized();
        let mut controller = Self { viewport: Viewport::default(), config };
        controller.viewport.zoom = controller.clamp_zoom(1.0);
        controller
    }

    /// The current viewport state.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> ViewportConfig {
        self.config
    }

    /// Replace the configuration at runtime. The new bounds are sanitized
    /// and the current zoom is re-clamped into them immediately.
    pub fn set_config(&mut self, config: ViewportConfig) {
        self.config = config.sanitized();
        self.viewport.zoom = self.clamp_zoom(self.viewport.zoom);
    }

    /// Translate the view by a screen-space delta. Pan deltas are not scaled
    /// by zoom: panning by N pixels moves the view by N pixels at any zoom
    /// level. Position is unclamped (content is conceptually infinite);
    /// non-finite deltas are ignored.
    pub fn pan(&mut self, delta_x: f64, delta_y: f64) {
        if !delta_x.is_finite() || !delta_y.is_finite() {
            return;
        }
        self.viewport.x += delta_x;
        self.viewport.y += delta_y;
    }

    /// Set the zoom level, clamped into `[min_zoom, max_zoom]`.
    ///
    /// With an anchor (a screen-space point), the pan offset is re-solved so
    /// the canvas point currently under the anchor stays under it. Without
    /// one, the pan offset is untouched and the zoom pivots on the canvas
    /// origin; callers wanting "zoom on screen center" pass the center
    /// explicitly. NaN requests keep the current zoom.
    pub fn zoom_to(&mut self, requested_zoom: f64, anchor: Option<Point>) {
        let old_zoom = self.viewport.zoom;
        let new_zoom = self.clamp_zoom(requested_zoom);
        if let Some(anchor) = anchor {
            if anchor.is_finite() {
                let ratio = new_zoom / old_zoom;
                self.viewport.x = anchor.x - (anchor.x - self.viewport.x) * ratio;
                self.viewport.y = anchor.y - (anchor.y - self.viewport.y) * ratio;
            }
        }
        self.viewport.zoom = new_zoom;
    }

    /// Step the zoom up by `zoom_step`, optionally anchored.
    pub fn zoom_in(&mut self, anchor: Option<Point>) {
        self.zoom_to(self.viewport.zoom + self.config.zoom_step, anchor);
    }

    /// Step the zoom down by `zoom_step`, optionally anchored.
    pub fn zoom_out(&mut self, anchor: Option<Point>) {
        self.zoom_to(self.viewport.zoom - self.config.zoom_step, anchor);
    }

    /// Reset to the identity viewport (origin at the top-left, 100% zoom).
    pub fn reset(&mut self) {
        self.viewport = Viewport::default();
        self.viewport.zoom = self.clamp_zoom(1.0);
    }

    /// Fit all node rectangles into a `viewport_width` × `viewport_height`
    /// view, keeping `padding` screen pixels free on every side, and center
    /// the content.
    ///
    /// An empty node set recenters on the screen midpoint at 100% zoom. A
    /// zero-area bounding box (single node position, or all coincident)
    /// falls back to 100% zoom centered on that point instead of dividing
    /// by zero.
    pub fn zoom_to_fit(
        &mut self,
        nodes: &[CanvasNode],
        viewport_width: f64,
        viewport_height: f64,
        padding: f64,
    ) {
        if !viewport_width.is_finite() || !viewport_height.is_finite() {
            return;
        }
        let padding = if padding.is_finite() { padding.max(0.0) } else { 0.0 };

        let Some((min, max)) = bounding_box(nodes) else {
            self.viewport = Viewport {
                x: viewport_width / 2.0,
                y: viewport_height / 2.0,
                zoom: self.clamp_zoom(1.0),
            };
            return;
        };

        let box_width = max.x - min.x;
        let box_height = max.y - min.y;
        let center = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);

        let zoom = if box_width <= f64::EPSILON || box_height <= f64::EPSILON {
            self.clamp_zoom(1.0)
        } else {
            let avail_width = (viewport_width - 2.0 * padding).max(1.0);
            let avail_height = (viewport_height - 2.0 * padding).max(1.0);
            let width_fit = avail_width / box_width;
            let height_fit = avail_height / box_height;
            // Fitting never zooms in past 100%; sparse content stays readable.
            self.clamp_zoom(width_fit.min(height_fit).min(1.0))
        };

        self.viewport = Viewport {
            x: viewport_width / 2.0 - center.x * zoom,
            y: viewport_height / 2.0 - center.y * zoom,
            zoom,
        };
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.viewport.zoom;
        }
        zoom.clamp(self.config.min_zoom, self.config.max_zoom)
    }
}

/// Axis-aligned bounding box over all node rectangles, or `None` when the
/// slice is empty. Nodes with non-finite positions are skipped.
fn bounding_box(nodes: &[CanvasNode]) -> Option<(Point, Point)> {
    let mut bounds: Option<(Point, Point)> = None;
    for node in nodes {
        let (x, y, width, height) = node.bounds();
        if !x.is_finite() || !y.is_finite() {
            continue;
        }
        let (min, max) = bounds.get_or_insert((
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ));
        min.x = min.x.min(x);
        min.y = min.y.min(y);
        max.x = max.x.max(x + width);
        max.y = max.y.max(y + height);
    }
    bounds
}
