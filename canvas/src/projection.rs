//! Read-only view of the placement state for the host renderer.

#[cfg(test)]
#[path = "projection_test.rs"]
mod projection_test;

use serde::Serialize;

use crate::geom::{CanvasSize, Point};
use crate::input::{DropZone, Selection, UiState};
use crate::pages::drop_zone;
use crate::store::{ElementKind, ItemId, LogoState, PageNumber, PlacementStore, Scale};

/// One product as the renderer draws it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub position: Point,
    pub rotation: f64,
    pub scale: Scale,
    /// True when the rotate and resize handles should be drawn.
    pub show_controls: bool,
}

/// One page as the renderer draws it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: PageNumber,
    pub items: Vec<ItemView>,
    pub date_position: Point,
    pub drop_zone: DropZone,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrochureView {
    pub canvas: CanvasSize,
    pub pages: Vec<PageView>,
    pub logo: LogoState,
    pub company_name: Point,
    pub logo_controls: bool,
    /// Cleared while a page is exported so editing chrome stays out of the
    /// image.
    pub edit_controls_visible: bool,
}

/// Project a single page.
#[must_use]
pub fn project_page(store: &PlacementStore, ui: &UiState, page: PageNumber) -> PageView {
    let items = store
        .items_on_page(page)
        .into_iter()
        .map(|item| ItemView {
            id: item.id,
            position: item.position,
            rotation: item.rotation,
            scale: item.scale,
            show_controls: ui.edit_controls_visible && ui.selection == Selection::Product { id: item.id },
        })
        .collect();
    PageView { page, items, date_position: store.date_position(page), drop_zone: drop_zone(ui.drop_target, page) }
}

/// Project every page.
#[must_use]
pub fn project(store: &PlacementStore, ui: &UiState, canvas: CanvasSize) -> BrochureView {
    BrochureView {
        canvas,
        pages: (1..=store.page_count()).map(|page| project_page(store, ui, page)).collect(),
        logo: store.logo(),
        company_name: store.element_position(ElementKind::CompanyName),
        logo_controls: ui.edit_controls_visible && ui.selection == Selection::Logo,
        edit_controls_visible: ui.edit_controls_visible,
    }
}
