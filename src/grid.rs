//! Grid snapping: rounding canvas coordinates to the nearest grid
//! intersection.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use crate::viewport::Point;

/// Snap a scalar canvas coordinate to the nearest multiple of `grid_size`.
///
/// No-op for non-positive or non-finite grid sizes and for non-finite
/// values. Idempotent: snapping a snapped value returns it unchanged.
#[must_use]
pub fn snap(value: f64, grid_size: f64) -> f64 {
    if !value.is_finite() || !grid_size.is_finite() || grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a canvas point componentwise.
#[must_use]
pub fn snap_point(point: Point, grid_size: f64) -> Point {
    Point {
        x: snap(point.x, grid_size),
        y: snap(point.y, grid_size),
    }
}
