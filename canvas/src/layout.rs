//! Auto-layout: one-shot balanced placement of every product, page by page.
//!
//! Each page is laid out independently with [`compute_dynamic_layout`] for
//! its own product count. Items fill the grid row-major in order of
//! appearance and the occupied block is centered inside the product area.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use std::collections::BTreeMap;

use tracing::debug;

use crate::consts::CELL_COUNT;
use crate::geom::{CanvasSize, Point};
use crate::grid::{compute_dynamic_layout, compute_fixed_grid};
use crate::store::{CanvasItem, ItemId, PageNumber, PlacementStore, Scale};

/// Compute a position for every item.
///
/// Pure: the same items on the same canvas always produce the same result.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn run_auto_layout<'a, I>(items: I, canvas: CanvasSize) -> BTreeMap<ItemId, Point>
where
    I: IntoIterator<Item = &'a CanvasItem>,
{
    let mut by_page: BTreeMap<PageNumber, Vec<ItemId>> = BTreeMap::new();
    for item in items {
        by_page.entry(item.page).or_default().push(item.id);
    }

    let mut positions = BTreeMap::new();
    for ids in by_page.values() {
        let layout = compute_dynamic_layout(ids.len(), canvas.width, canvas.height);
        let size = layout.item_size;
        let space_x = size + layout.gap_x();
        let space_y = size + layout.gap_y();

        let rows_used = ids.len().div_ceil(layout.cols).max(1);
        let total_w = (layout.cols - 1) as f64 * space_x + size;
        let total_h = (rows_used - 1) as f64 * space_y + size;
        let offset_x = (layout.available_width - total_w) / 2.0;
        let offset_y = (layout.available_height - total_h) / 2.0;

        for (index, id) in ids.iter().enumerate() {
            let col = (index % layout.cols) as f64;
            let row = (index / layout.cols) as f64;
            positions.insert(
                *id,
                Point::new(
                    layout.margin_x + offset_x + col * space_x,
                    layout.margin_y + offset_y + row * space_y,
                ),
            );
        }
    }
    positions
}

/// Run auto-layout over the store and write the result back.
///
/// Every position is overwritten and every scale reset to 1. Rotations are
/// kept. Grid occupancy is re-derived page by page: in order of appearance,
/// each item claims the free fixed cell nearest its new position, so no two
/// items on a page share a cell. Items past the ninth on a page get no cell.
/// Returns the number of items moved.
pub fn apply_auto_layout(store: &mut PlacementStore, canvas: CanvasSize) -> usize {
    let positions = run_auto_layout(store.items(), canvas);
    let grid = compute_fixed_grid(canvas.width, canvas.height);
    let order: Vec<(ItemId, PageNumber)> = store.items().map(|item| (item.id, item.page)).collect();

    let mut taken: BTreeMap<PageNumber, [bool; CELL_COUNT]> = BTreeMap::new();
    let mut applied = 0;
    for (id, page) in order {
        let Some(position) = positions.get(&id).copied() else {
            continue;
        };
        let page_cells = taken.entry(page).or_insert([false; CELL_COUNT]);
        let cell = grid.nearest_free_cell(position, page_cells);
        if let Some(slot) = cell.and_then(|c| page_cells.get_mut(c)) {
            *slot = true;
        }

        let updated = store.set_position(id, position).and_then(|()| {
            store.set_scale(id, Scale::default())?;
            store.set_grid_index(id, cell)
        });
        match updated {
            Ok(()) => applied += 1,
            Err(e) => debug!(id, error = %e, "auto-layout skipped item"),
        }
    }
    debug!(applied, pages = store.page_count(), "auto-layout applied");
    applied
}
