//! Geometry engine: the fixed 3×3 placement grid and the dynamic auto-layout
//! grid.
//!
//! Both grids live in the product area of a page: the canvas minus the
//! horizontal margins, the header/banner band at the top and the footer band
//! at the bottom. Everything here is a pure function of its inputs.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    AUTO_MIN_GAP, CELL_COUNT, FIXED_COLS, FIXED_GAP, FIXED_ROWS, GRID_BOTTOM_OFFSET, GRID_TOP, MARGIN_X,
    MIN_ITEM_SIZE, PRODUCT_FOOTPRINT,
};
use crate::geom::{CanvasSize, Point, clamp_axis};

/// Usable product area of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProductArea {
    width: f64,
    height: f64,
}

impl ProductArea {
    fn of(canvas: CanvasSize) -> Self {
        Self {
            width: canvas.width - 2.0 * MARGIN_X,
            height: canvas.height - GRID_TOP - GRID_BOTTOM_OFFSET,
        }
    }
}

// =============================================================================
// FIXED GRID
// =============================================================================

/// The fixed 3×3 grid used for manual placement and snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedGrid {
    /// Edge length of every (square) cell.
    pub cell_size: f64,
    /// Spacing between neighbouring cells.
    pub gap: f64,
    /// Top-left corner of each cell in row-major order.
    pub cells: [Point; CELL_COUNT],
    /// Canvas the grid was computed for.
    pub canvas: CanvasSize,
}

impl FixedGrid {
    /// Where a product resting in `index` sits: the cell's top-left corner,
    /// pulled in so the full product footprint stays on the canvas.
    ///
    /// Indices past the last cell resolve to the last cell.
    #[must_use]
    pub fn cell(&self, index: usize) -> Point {
        let corner = self.cells.get(index).or(self.cells.last()).copied().unwrap_or_default();
        Point::new(
            clamp_axis(corner.x, PRODUCT_FOOTPRINT, self.canvas.width),
            clamp_axis(corner.y, PRODUCT_FOOTPRINT, self.canvas.height),
        )
    }

    /// Index of the cell whose top-left corner is nearest to `point`.
    ///
    /// Ties resolve to the lowest index.
    #[must_use]
    pub fn nearest_cell(&self, point: Point) -> usize {
        let mut nearest = 0;
        let mut nearest_dist = f64::MAX;
        for (idx, cell) in self.cells.iter().enumerate() {
            let d = point.distance_sq(*cell);
            if d < nearest_dist {
                nearest_dist = d;
                nearest = idx;
            }
        }
        nearest
    }

    /// Nearest cell to `point` that `taken` does not mark, or `None` when
    /// every cell is taken.
    ///
    /// Ties resolve to the lowest index.
    #[must_use]
    pub fn nearest_free_cell(&self, point: Point, taken: &[bool; CELL_COUNT]) -> Option<usize> {
        self.cells
            .iter()
            .zip(taken)
            .enumerate()
            .filter(|(_, (_, is_taken))| !**is_taken)
            .fold(None, |best: Option<(usize, f64)>, (idx, (cell, _))| {
                let d = point.distance_sq(*cell);
                match best {
                    Some((_, best_dist)) if best_dist <= d => best,
                    _ => Some((idx, d)),
                }
            })
            .map(|(idx, _)| idx)
    }
}

/// Compute the fixed 3×3 grid for a canvas of `width` × `height`.
///
/// Malformed dimensions are raised to the minimum usable canvas, so the
/// result is always finite.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_fixed_grid(width: f64, height: f64) -> FixedGrid {
    let canvas = CanvasSize::clamped(width, height);
    let area = ProductArea::of(canvas);
    let cols = FIXED_COLS as f64;
    let rows = FIXED_ROWS as f64;

    let cell_w = (area.width - FIXED_GAP * (cols - 1.0)) / cols;
    let cell_h = (area.height - FIXED_GAP * (rows - 1.0)) / rows;
    let cell_size = cell_w.min(cell_h).floor();

    let total_w = cols * cell_size + FIXED_GAP * (cols - 1.0);
    let total_h = rows * cell_size + FIXED_GAP * (rows - 1.0);
    let offset_x = MARGIN_X + ((area.width - total_w) / 2.0).floor();
    let offset_y = GRID_TOP + ((area.height - total_h) / 2.0).floor();

    let mut cells = [Point::default(); CELL_COUNT];
    for (i, cell) in cells.iter_mut().enumerate() {
        let c = (i % FIXED_COLS) as f64;
        let r = (i / FIXED_COLS) as f64;
        *cell = Point::new(offset_x + c * (cell_size + FIXED_GAP), offset_y + r * (cell_size + FIXED_GAP));
    }

    FixedGrid { cell_size, gap: FIXED_GAP, cells, canvas }
}

// =============================================================================
// DYNAMIC LAYOUT
// =============================================================================

/// Column/row count and item size chosen for a page's product count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicLayout {
    pub cols: usize,
    pub rows: usize,
    /// Edge length of every (square) item.
    pub item_size: f64,
    pub available_width: f64,
    pub available_height: f64,
    /// Left edge of the product area.
    pub margin_x: f64,
    /// Top edge of the product area.
    pub margin_y: f64,
}

impl DynamicLayout {
    /// Horizontal gap between columns. Zero for a single column.
    #[must_use]
    pub fn gap_x(&self) -> f64 {
        balanced_gap(self.available_width, self.cols, self.item_size)
    }

    /// Vertical gap between rows. Zero for a single row.
    #[must_use]
    pub fn gap_y(&self) -> f64 {
        balanced_gap(self.available_height, self.rows, self.item_size)
    }
}

#[allow(clippy::cast_precision_loss)]
fn balanced_gap(available: f64, count: usize, size: f64) -> f64 {
    if count > 1 {
        let n = count as f64;
        AUTO_MIN_GAP.max((available - n * size) / (n - 1.0))
    } else {
        0.0
    }
}

/// Pick the grid shape and item size for `item_count` products on a canvas of
/// `width` × `height`.
///
/// A count of zero is treated as one.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_dynamic_layout(item_count: usize, width: f64, height: f64) -> DynamicLayout {
    let canvas = CanvasSize::clamped(width, height);
    let area = ProductArea::of(canvas);
    let (aw, ah) = (area.width, area.height);
    let count = item_count.max(1);

    let (cols, rows, size) = match count {
        1 => (1, 1, 380.0_f64.min(aw * 0.9).min(ah * 0.8)),
        2 => (2, 1, 300.0_f64.min((aw - 20.0) / 2.0)),
        3 => (3, 1, 240.0_f64.min((aw - 40.0) / 3.0)),
        4 => (2, 2, 220.0_f64.min((aw - 20.0) / 2.0).min((ah - 20.0) / 2.0)),
        5..=6 => (3, 2, 150.0_f64.min((aw - 60.0) / 3.0).min((ah - 30.0) / 2.0)),
        7..=9 => (3, 3, 130.0_f64.min((aw - 60.0) / 3.0).min((ah - 60.0) / 3.0)),
        10..=12 => (4, 3, 110.0_f64.min((aw - 90.0) / 4.0).min((ah - 60.0) / 3.0)),
        _ => {
            let rows = count.div_ceil(4);
            let r = rows as f64;
            (4, rows, 100.0_f64.min((aw - 90.0) / 4.0).min((ah - (r - 1.0) * 20.0) / r))
        }
    };

    DynamicLayout {
        cols,
        rows,
        item_size: size.max(MIN_ITEM_SIZE),
        available_width: aw,
        available_height: ah,
        margin_x: MARGIN_X,
        margin_y: GRID_TOP,
    }
}
