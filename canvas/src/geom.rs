//! Canvas-local coordinate primitives.
//!
//! All positions in this crate are in canvas-local CSS pixels with the origin
//! at the top-left corner of a page. There is no pan or zoom: every page is a
//! fixed-size sheet.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{MIN_CANVAS_HEIGHT, MIN_CANVAS_WIDTH};

/// A point in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Offset this point by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// True when both coordinates are exactly zero. Saved records use
    /// `(0, 0)` to mean "never positioned".
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_origin(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Malformed canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("canvas dimension is not finite: {width} x {height}")]
    NonFinite { width: f64, height: f64 },
    #[error("canvas dimension must be positive: {width} x {height}")]
    NonPositive { width: f64, height: f64 },
}

impl GeometryError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonFinite { .. } => "E_GEOMETRY_NON_FINITE",
            Self::NonPositive { .. } => "E_GEOMETRY_NON_POSITIVE",
        }
    }
}

/// Width and height of a page canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    /// Validate a canvas size.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] for non-finite or non-positive dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        if !width.is_finite() || !height.is_finite() {
            return Err(GeometryError::NonFinite { width, height });
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::NonPositive { width, height });
        }
        Ok(Self { width, height })
    }

    /// Build a canvas size that is always usable by the geometry engine.
    ///
    /// Malformed or undersized dimensions are raised to the minimum usable
    /// canvas instead of failing.
    #[must_use]
    pub fn clamped(width: f64, height: f64) -> Self {
        match Self::new(width, height) {
            Ok(size) => Self {
                width: size.width.max(MIN_CANVAS_WIDTH),
                height: size.height.max(MIN_CANVAS_HEIGHT),
            },
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "malformed canvas size; using minimum");
                Self { width: MIN_CANVAS_WIDTH, height: MIN_CANVAS_HEIGHT }
            }
        }
    }
}

/// Angle in degrees of `pointer` around `center`, measured with `atan2`.
#[must_use]
pub fn angle_deg(center: Point, pointer: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees()
}

/// Clamp one coordinate so a footprint of `extent` starting there stays on a
/// canvas axis of length `limit`. Never returns a negative value.
#[must_use]
pub fn clamp_axis(value: f64, extent: f64, limit: f64) -> f64 {
    value.min(limit - extent).max(0.0)
}

/// Center a square footprint of `extent` on `pointer` and clamp it inside
/// `canvas`.
#[must_use]
pub fn centered_clamped(pointer: Point, extent: f64, canvas: CanvasSize) -> Point {
    let half = extent / 2.0;
    Point {
        x: clamp_axis(pointer.x - half, extent, canvas.width),
        y: clamp_axis(pointer.y - half, extent, canvas.height),
    }
}
