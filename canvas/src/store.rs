//! Placement store: the authoritative layout state of one brochure.
//!
//! This module defines what is on the pages (`CanvasItem`, the free elements,
//! per-page date labels), a sparse-update type for incremental edits
//! (`ItemPatch`), the seed type used to hydrate from saved records
//! (`ItemSeed`), and the runtime store that owns all of it
//! (`PlacementStore`).
//!
//! Data flows into this layer from the persistence collaborator (seeding) and
//! from the interaction engine, the auto-layout planner and the page manager
//! (mutations). The render projection reads from it.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{CELL_COUNT, DEFAULT_COMPANY_NAME_POS, DEFAULT_DATE_POS, DEFAULT_LOGO_POS};
use crate::geom::Point;
use crate::grid::FixedGrid;

/// Identifier of a placed product (the campaign-product record id).
pub type ItemId = i64;

/// 1-based page number.
pub type PageNumber = u32;

// =============================================================================
// TYPES
// =============================================================================

/// A free element positioned independently of the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Logo,
    CompanyName,
}

/// Independent horizontal and vertical scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Scale {
    /// The same factor on both axes.
    #[must_use]
    pub fn uniform(factor: f64) -> Self {
        Self { scale_x: factor, scale_y: factor }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// A product placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasItem {
    pub id: ItemId,
    /// Top-left corner in canvas-local pixels.
    pub position: Point,
    /// Clockwise rotation in degrees. Accumulates without wrapping.
    pub rotation: f64,
    pub scale: Scale,
    pub page: PageNumber,
    /// Fixed-grid cell the item rests in, if it has been snapped to one.
    pub grid_index: Option<usize>,
}

/// Logo transform state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogoState {
    pub position: Point,
    pub rotation: f64,
    pub scale: f64,
}

impl Default for LogoState {
    fn default() -> Self {
        Self { position: Point::new(DEFAULT_LOGO_POS.0, DEFAULT_LOGO_POS.1), rotation: 0.0, scale: 1.0 }
    }
}

/// Saved placement used to hydrate an item. Absent fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSeed {
    pub id: ItemId,
    pub position: Option<Point>,
    pub rotation: Option<f64>,
    pub scale: Option<Scale>,
    pub page: Option<PageNumber>,
}

/// Sparse update for a canvas item. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_index: Option<usize>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// A page or grid-cell index outside its valid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OutOfRangeError {
    #[error("page {page} outside 1..={page_count}")]
    Page { page: PageNumber, page_count: PageNumber },
    #[error("grid index {index} outside 0..{CELL_COUNT}")]
    GridIndex { index: usize },
}

/// An operation referenced an item that is not in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("item not found: {0}")]
    UnknownItem(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl StoreError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfRange(OutOfRangeError::Page { .. }) => "E_PAGE_OUT_OF_RANGE",
            Self::OutOfRange(OutOfRangeError::GridIndex { .. }) => "E_GRID_INDEX_OUT_OF_RANGE",
            Self::Lookup(_) => "E_ITEM_NOT_FOUND",
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// In-memory placement state for every page of a brochure.
#[derive(Debug, Clone)]
pub struct PlacementStore {
    items: HashMap<ItemId, CanvasItem>,
    /// Item ids in order of appearance.
    order: Vec<ItemId>,
    logo: LogoState,
    company_name: Point,
    date_positions: BTreeMap<PageNumber, Point>,
    page_count: PageNumber,
}

impl PlacementStore {
    /// Create an empty single-page store.
    #[must_use]
    pub fn new() -> Self {
        let mut store = Self {
            items: HashMap::new(),
            order: Vec::new(),
            logo: LogoState::default(),
            company_name: Point::new(DEFAULT_COMPANY_NAME_POS.0, DEFAULT_COMPANY_NAME_POS.1),
            date_positions: BTreeMap::new(),
            page_count: 1,
        };
        store.ensure_date_positions();
        store
    }

    // --- Items ---

    /// Insert or replace an item. New ids are appended to the appearance order.
    pub fn insert(&mut self, item: CanvasItem) {
        if !self.items.contains_key(&item.id) {
            self.order.push(item.id);
        }
        self.items.insert(item.id, item);
    }

    /// Remove an item by id, returning it if it was present.
    pub fn remove(&mut self, id: ItemId) -> Option<CanvasItem> {
        let removed = self.items.remove(&id);
        if removed.is_some() {
            self.order.retain(|other| *other != id);
        }
        removed
    }

    /// Drop every item whose id is not in `keep`.
    pub fn retain_items(&mut self, keep: &[ItemId]) {
        self.order.retain(|id| keep.contains(id));
        self.items.retain(|id, _| keep.contains(id));
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&CanvasItem> {
        self.items.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// All items in order of appearance.
    pub fn items(&self) -> impl Iterator<Item = &CanvasItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Ids in order of appearance.
    #[must_use]
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    /// Items on `page`, in order of appearance.
    #[must_use]
    pub fn items_on_page(&self, page: PageNumber) -> Vec<&CanvasItem> {
        self.items().filter(|item| item.page == page).collect()
    }

    /// A clone of every item in order of appearance.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CanvasItem> {
        self.items().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Hydrate items from saved placements.
    ///
    /// Ids already in the store keep their live state. A new item with a
    /// saved non-zero position uses it verbatim; otherwise it is placed into
    /// the next free fixed-grid cell of its page, starting from its order of
    /// appearance among the seeds on that page.
    #[allow(clippy::float_cmp)]
    pub fn seed(&mut self, seeds: &[ItemSeed], grid: &FixedGrid) {
        let max_page = seeds
            .iter()
            .map(|s| normalize_page(s.page))
            .max()
            .unwrap_or(1);
        if max_page > self.page_count {
            debug!(max_page, page_count = self.page_count, "seeded pages exceed page count; growing");
            self.set_page_count(max_page);
        }

        let mut ordinal_in_page: HashMap<PageNumber, usize> = HashMap::new();
        for seed in seeds {
            let page = normalize_page(seed.page);
            let slot = ordinal_in_page.entry(page).or_insert(0);
            let ordinal = *slot;
            *slot += 1;

            if self.contains(seed.id) {
                continue;
            }

            let (position, grid_index) = match seed.position {
                Some(saved) if !saved.is_origin() => (saved, None),
                _ => {
                    let cell = self.next_free_cell(page, ordinal);
                    (grid.cell(cell), Some(cell))
                }
            };

            let scale = seed
                .scale
                .map(|s| Scale {
                    scale_x: if s.scale_x == 0.0 { 1.0 } else { s.scale_x },
                    scale_y: if s.scale_y == 0.0 { 1.0 } else { s.scale_y },
                })
                .unwrap_or_default();

            self.insert(CanvasItem {
                id: seed.id,
                position,
                rotation: seed.rotation.unwrap_or(0.0),
                scale,
                page,
                grid_index,
            });
        }
    }

    /// First unoccupied cell on `page` scanning from `start`, wrapping once.
    /// Falls back to `start` (capped at the last cell) when the page is full.
    fn next_free_cell(&self, page: PageNumber, start: usize) -> usize {
        let capped = start.min(CELL_COUNT - 1);
        (0..CELL_COUNT)
            .map(|step| (capped + step) % CELL_COUNT)
            .find(|cell| self.occupant(page, *cell, None).is_none())
            .unwrap_or(capped)
    }

    /// The item resting in `cell` on `page`, ignoring `except`.
    #[must_use]
    pub fn occupant(&self, page: PageNumber, cell: usize, except: Option<ItemId>) -> Option<ItemId> {
        self.items()
            .find(|item| item.page == page && item.grid_index == Some(cell) && Some(item.id) != except)
            .map(|item| item.id)
    }

    // --- Item fields ---

    #[must_use]
    pub fn position(&self, id: ItemId) -> Option<Point> {
        self.get(id).map(|item| item.position)
    }

    /// # Errors
    ///
    /// Returns [`LookupError`] if the item is unknown.
    pub fn set_position(&mut self, id: ItemId, position: Point) -> Result<(), LookupError> {
        self.item_mut(id)?.position = position;
        Ok(())
    }

    #[must_use]
    pub fn rotation(&self, id: ItemId) -> Option<f64> {
        self.get(id).map(|item| item.rotation)
    }

    /// # Errors
    ///
    /// Returns [`LookupError`] if the item is unknown.
    pub fn set_rotation(&mut self, id: ItemId, rotation: f64) -> Result<(), LookupError> {
        self.item_mut(id)?.rotation = rotation;
        Ok(())
    }

    #[must_use]
    pub fn scale(&self, id: ItemId) -> Option<Scale> {
        self.get(id).map(|item| item.scale)
    }

    /// # Errors
    ///
    /// Returns [`LookupError`] if the item is unknown.
    pub fn set_scale(&mut self, id: ItemId, scale: Scale) -> Result<(), LookupError> {
        self.item_mut(id)?.scale = scale;
        Ok(())
    }

    #[must_use]
    pub fn page(&self, id: ItemId) -> Option<PageNumber> {
        self.get(id).map(|item| item.page)
    }

    /// Assign an item to a page.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::Page`] when `page` is outside
    /// `1..=page_count`, or [`LookupError`] if the item is unknown.
    pub fn set_page(&mut self, id: ItemId, page: PageNumber) -> Result<(), StoreError> {
        if page == 0 || page > self.page_count {
            return Err(OutOfRangeError::Page { page, page_count: self.page_count }.into());
        }
        self.item_mut(id)?.page = page;
        Ok(())
    }

    /// Assign an item to a page, clamping `page` into `1..=page_count`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the item is unknown.
    pub fn set_page_clamped(&mut self, id: ItemId, page: PageNumber) -> Result<PageNumber, LookupError> {
        let clamped = self.clamp_page(page);
        if clamped != page {
            debug!(id, page, clamped, "page out of range; clamped");
        }
        self.item_mut(id)?.page = clamped;
        Ok(clamped)
    }

    #[must_use]
    pub fn grid_index(&self, id: ItemId) -> Option<usize> {
        self.get(id).and_then(|item| item.grid_index)
    }

    /// Set or clear an item's grid cell. Indices past the last cell are
    /// clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the item is unknown.
    pub fn set_grid_index(&mut self, id: ItemId, index: Option<usize>) -> Result<(), LookupError> {
        let clamped = index.map(|i| {
            if i >= CELL_COUNT {
                let err = OutOfRangeError::GridIndex { index: i };
                debug!(id, error = %err, "grid index clamped");
            }
            i.min(CELL_COUNT - 1)
        });
        self.item_mut(id)?.grid_index = clamped;
        Ok(())
    }

    /// Apply a partial update. Returns false if the item doesn't exist.
    ///
    /// Pages are clamped into range; grid indices are clamped to the last cell.
    pub fn apply_patch(&mut self, id: ItemId, patch: &ItemPatch) -> bool {
        let page = patch.page.map(|p| self.clamp_page(p));
        let Some(item) = self.items.get_mut(&id) else {
            return false;
        };
        if let Some(position) = patch.position {
            item.position = position;
        }
        if let Some(rotation) = patch.rotation {
            item.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            item.scale = scale;
        }
        if let Some(page) = page {
            item.page = page;
        }
        if let Some(index) = patch.grid_index {
            item.grid_index = Some(index.min(CELL_COUNT - 1));
        }
        true
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut CanvasItem, LookupError> {
        self.items.get_mut(&id).ok_or(LookupError::UnknownItem(id))
    }

    // --- Free elements ---

    #[must_use]
    pub fn element_position(&self, kind: ElementKind) -> Point {
        match kind {
            ElementKind::Logo => self.logo.position,
            ElementKind::CompanyName => self.company_name,
        }
    }

    pub fn set_element_position(&mut self, kind: ElementKind, position: Point) {
        match kind {
            ElementKind::Logo => self.logo.position = position,
            ElementKind::CompanyName => self.company_name = position,
        }
    }

    #[must_use]
    pub fn logo(&self) -> LogoState {
        self.logo
    }

    pub fn set_logo_rotation(&mut self, rotation: f64) {
        self.logo.rotation = rotation;
    }

    pub fn set_logo_scale(&mut self, scale: f64) {
        self.logo.scale = scale;
    }

    // --- Pages ---

    #[must_use]
    pub fn page_count(&self) -> PageNumber {
        self.page_count
    }

    /// Set the page count (at least 1) and make sure every page has a date
    /// label position. Does not move items; see [`crate::pages`].
    pub fn set_page_count(&mut self, count: PageNumber) {
        self.page_count = count.max(1);
        self.ensure_date_positions();
    }

    /// Clamp `page` into `1..=page_count`.
    #[must_use]
    pub fn clamp_page(&self, page: PageNumber) -> PageNumber {
        page.clamp(1, self.page_count)
    }

    /// Date-label position on `page`, falling back to the default.
    #[must_use]
    pub fn date_position(&self, page: PageNumber) -> Point {
        self.date_positions
            .get(&page)
            .copied()
            .unwrap_or(Point::new(DEFAULT_DATE_POS.0, DEFAULT_DATE_POS.1))
    }

    /// Move the date label on `page`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError::Page`] when `page` is outside `1..=page_count`.
    pub fn set_date_position(&mut self, page: PageNumber, position: Point) -> Result<(), OutOfRangeError> {
        if page == 0 || page > self.page_count {
            return Err(OutOfRangeError::Page { page, page_count: self.page_count });
        }
        self.date_positions.insert(page, position);
        Ok(())
    }

    /// Give every page without a date-label position the default one.
    /// Positions on pages past the count are kept for when the page returns.
    pub fn ensure_date_positions(&mut self) {
        for page in 1..=self.page_count {
            self.date_positions
                .entry(page)
                .or_insert(Point::new(DEFAULT_DATE_POS.0, DEFAULT_DATE_POS.1));
        }
    }
}

impl Default for PlacementStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Saved page numbers of zero or absent mean page 1.
fn normalize_page(page: Option<PageNumber>) -> PageNumber {
    page.filter(|p| *p > 0).unwrap_or(1)
}
