//! Page bookkeeping: adding and removing pages, moving products between
//! pages, and spreading products over a page count.
//!
//! Everything here mutates the [`PlacementStore`] directly. Positions are
//! left alone; callers schedule an auto-layout pass afterwards.

#[cfg(test)]
#[path = "pages_test.rs"]
mod pages_test;

use tracing::{debug, info};

use crate::consts::CELL_COUNT;
use crate::input::DropZone;
use crate::store::{ItemId, LookupError, PageNumber, PlacementStore};

/// Append a page and return its number.
pub fn add_page(store: &mut PlacementStore) -> PageNumber {
    let page = store.page_count() + 1;
    store.set_page_count(page);
    debug!(page, "page added");
    page
}

/// Remove the last page, moving its products to the new last page.
///
/// Returns the migrated item ids, or `None` when only one page exists.
pub fn remove_page(store: &mut PlacementStore) -> Option<Vec<ItemId>> {
    let last = store.page_count();
    if last <= 1 {
        debug!("refusing to remove the only page");
        return None;
    }

    let target = last - 1;
    let migrating: Vec<ItemId> = store.items_on_page(last).iter().map(|item| item.id).collect();
    store.set_page_count(target);
    for id in &migrating {
        if let Err(e) = store.set_page_clamped(*id, target) {
            debug!(id, error = %e, "migration skipped item");
        }
    }
    info!(removed = last, migrated = migrating.len(), "page removed");
    Some(migrating)
}

/// Reassign a product to `page`, clamped into range.
///
/// # Errors
///
/// Returns [`LookupError`] if the product is not on the canvas.
pub fn move_product_to_page(store: &mut PlacementStore, id: ItemId, page: PageNumber) -> Result<PageNumber, LookupError> {
    let assigned = store.set_page_clamped(id, page)?;
    debug!(id, page = assigned, "product moved to page");
    Ok(assigned)
}

/// Page for the item at `index` when filling pages nine at a time.
#[must_use]
pub fn distributed_page(index: usize, page_count: PageNumber) -> PageNumber {
    let page = PageNumber::try_from(index / CELL_COUNT + 1).unwrap_or(PageNumber::MAX);
    page.min(page_count.max(1))
}

/// Fill pages nine products at a time in order of appearance; overflow
/// stays on the last page. Grows the page count to `page_count` if needed.
pub fn distribute_products_across_pages(store: &mut PlacementStore, page_count: PageNumber) {
    let page_count = page_count.max(1);
    if store.page_count() < page_count {
        store.set_page_count(page_count);
    }
    let ids = store.ids().to_vec();
    for (index, id) in ids.iter().enumerate() {
        if let Err(e) = store.set_page_clamped(*id, distributed_page(index, page_count)) {
            debug!(id, error = %e, "distribution skipped item");
        }
    }
    debug!(items = ids.len(), page_count, "products distributed");
}

/// Set the page count and, when products exist, redistribute them.
pub fn set_page_count(store: &mut PlacementStore, page_count: PageNumber) {
    let page_count = page_count.max(1);
    store.set_page_count(page_count);
    if !store.is_empty() {
        distribute_products_across_pages(store, page_count);
    }
}

/// Parse the text payload carried by a product drag. Returns `None` for
/// anything that is not an integer id.
#[must_use]
pub fn parse_drop_payload(payload: &str) -> Option<ItemId> {
    match payload.trim().parse::<ItemId>() {
        Ok(id) => Some(id),
        Err(e) => {
            debug!(payload, error = %e, "ignoring drop payload");
            None
        }
    }
}

/// Drop-zone state of `page` given the currently highlighted page.
#[must_use]
pub fn drop_zone(drop_target: Option<PageNumber>, page: PageNumber) -> DropZone {
    if drop_target == Some(page) { DropZone::DragOver } else { DropZone::Idle }
}
