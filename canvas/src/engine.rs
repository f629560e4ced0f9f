use tracing::{debug, info};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use crate::consts::{
    AUTO_LAYOUT_DEBOUNCE_MS, DATE_LABEL_HEIGHT, DATE_LABEL_WIDTH, DESIGN_ENTRY_DELAY_MS, ELEMENT_FOOTPRINT,
    LOGO_BASE_SIZE, LOGO_MIN_SCALE, PRODUCT_FOOTPRINT, PRODUCT_MIN_SCALE, RESIZE_SENSITIVITY,
};
use crate::debounce::Debouncer;
use crate::geom::{CanvasSize, Point, angle_deg, centered_clamped, clamp_axis};
use crate::grid::{FixedGrid, compute_fixed_grid};
use crate::hit::hit_test;
use crate::input::{InteractionSession, Selection, Target, UiState};
use crate::layout::apply_auto_layout;
use crate::pages;
use crate::projection::{BrochureView, project};
use crate::store::{ElementKind, ItemId, ItemSeed, PageNumber, PlacementStore, Scale};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The view changed and should be redrawn.
    RenderNeeded,
    /// A product came to rest at a new position that should be persisted.
    PositionCommitted { id: ItemId, x: f64, y: f64 },
    /// Auto-layout rewrote the positions of `items` products.
    AutoLayoutApplied { items: usize },
    /// The highlighted drop zone changed.
    DropTargetChanged { page: Option<PageNumber> },
    SelectionChanged(Selection),
    /// Pages were added or removed.
    PageCountChanged { page_count: PageNumber },
}

/// Delays applied before auto-layout runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineTiming {
    /// Debounce after the product set or page count changes.
    pub auto_layout_debounce_ms: f64,
    /// Delay before the first layout after entering design mode.
    pub design_entry_delay_ms: f64,
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self { auto_layout_debounce_ms: AUTO_LAYOUT_DEBOUNCE_MS, design_entry_delay_ms: DESIGN_ENTRY_DELAY_MS }
    }
}

/// Core engine state: all logic that doesn't depend on the page element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub store: PlacementStore,
    pub ui: UiState,
    pub session: InteractionSession,
    canvas: CanvasSize,
    grid: FixedGrid,
    layout_timer: Debouncer,
    timing: EngineTiming,
    design_mode: bool,
}

impl EngineCore {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_timing(width, height, EngineTiming::default())
    }

    #[must_use]
    pub fn with_timing(width: f64, height: f64, timing: EngineTiming) -> Self {
        let canvas = CanvasSize::clamped(width, height);
        Self {
            store: PlacementStore::new(),
            ui: UiState::default(),
            session: InteractionSession::Idle,
            canvas,
            grid: compute_fixed_grid(canvas.width, canvas.height),
            layout_timer: Debouncer::new(),
            timing,
            design_mode: false,
        }
    }

    // --- Canvas ---

    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    #[must_use]
    pub fn grid(&self) -> &FixedGrid {
        &self.grid
    }

    /// Resize the canvas. Malformed sizes fall back to the minimum canvas.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> Vec<Action> {
        let canvas = CanvasSize::clamped(width, height);
        if canvas == self.canvas {
            return Vec::new();
        }
        self.canvas = canvas;
        self.grid = compute_fixed_grid(canvas.width, canvas.height);
        debug!(width = canvas.width, height = canvas.height, "canvas resized");
        vec![Action::RenderNeeded]
    }

    // --- Product set ---

    /// Make the canvas hold exactly the seeded products.
    ///
    /// Products no longer listed are dropped; new ones are placed from their
    /// saved state. A change in the number of products schedules auto-layout.
    pub fn sync_products(&mut self, seeds: &[ItemSeed], now_ms: f64) -> Vec<Action> {
        let before = self.store.len();
        let keep: Vec<ItemId> = seeds.iter().map(|s| s.id).collect();
        self.store.retain_items(&keep);
        self.store.seed(seeds, &self.grid);

        let mut actions = Vec::new();
        if let Selection::Product { id } = self.ui.selection
            && !self.store.contains(id)
        {
            self.ui.selection = Selection::None;
            actions.push(Action::SelectionChanged(Selection::None));
        }
        if self.store.len() != before {
            self.schedule_layout(now_ms, self.timing.auto_layout_debounce_ms);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Switch to design mode with `page_count` pages and lay out shortly after.
    pub fn enter_design_mode(&mut self, page_count: PageNumber, now_ms: f64) -> Vec<Action> {
        self.design_mode = true;
        self.store.set_page_count(page_count);
        self.schedule_layout(now_ms, self.timing.design_entry_delay_ms);
        info!(page_count = self.store.page_count(), "design mode entered");
        vec![Action::PageCountChanged { page_count: self.store.page_count() }, Action::RenderNeeded]
    }

    #[must_use]
    pub fn is_design_mode(&self) -> bool {
        self.design_mode
    }

    // --- Auto-layout ---

    fn schedule_layout(&mut self, now_ms: f64, delay_ms: f64) {
        if self.store.is_empty() {
            return;
        }
        self.layout_timer.schedule(now_ms, delay_ms);
    }

    /// Whether an auto-layout pass is waiting to run.
    #[must_use]
    pub fn layout_pending(&self) -> bool {
        self.layout_timer.is_pending()
    }

    /// Advance host time. Runs a due auto-layout unless a gesture is active,
    /// in which case it stays pending until the gesture ends.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        if !self.session.is_idle() {
            return Vec::new();
        }
        if self.layout_timer.poll(now_ms) { self.run_auto_layout() } else { Vec::new() }
    }

    /// Lay out every page now, cancelling any pending pass.
    pub fn run_auto_layout(&mut self) -> Vec<Action> {
        self.layout_timer.cancel();
        let items = apply_auto_layout(&mut self.store, self.canvas);
        vec![Action::AutoLayoutApplied { items }, Action::RenderNeeded]
    }

    // --- Pages ---

    pub fn add_page(&mut self, now_ms: f64) -> Vec<Action> {
        let page_count = pages::add_page(&mut self.store);
        self.schedule_layout(now_ms, self.timing.auto_layout_debounce_ms);
        vec![Action::PageCountChanged { page_count }, Action::RenderNeeded]
    }

    pub fn remove_page(&mut self, now_ms: f64) -> Vec<Action> {
        if pages::remove_page(&mut self.store).is_none() {
            return Vec::new();
        }
        self.schedule_layout(now_ms, self.timing.auto_layout_debounce_ms);
        vec![Action::PageCountChanged { page_count: self.store.page_count() }, Action::RenderNeeded]
    }

    pub fn set_page_count(&mut self, page_count: PageNumber, now_ms: f64) -> Vec<Action> {
        pages::set_page_count(&mut self.store, page_count);
        self.schedule_layout(now_ms, self.timing.auto_layout_debounce_ms);
        vec![Action::PageCountChanged { page_count: self.store.page_count() }, Action::RenderNeeded]
    }

    /// Re-spread products nine per page over the current page count.
    pub fn distribute_products(&mut self, now_ms: f64) -> Vec<Action> {
        let page_count = self.store.page_count();
        pages::distribute_products_across_pages(&mut self.store, page_count);
        self.schedule_layout(now_ms, self.timing.auto_layout_debounce_ms);
        vec![Action::RenderNeeded]
    }

    pub fn move_product_to_page(&mut self, id: ItemId, page: PageNumber, now_ms: f64) -> Vec<Action> {
        match pages::move_product_to_page(&mut self.store, id, page) {
            Ok(_) => {
                self.schedule_layout(now_ms, self.timing.auto_layout_debounce_ms);
                vec![Action::RenderNeeded]
            }
            Err(e) => {
                debug!(error = %e, "move to page ignored");
                Vec::new()
            }
        }
    }

    // --- Drop zones ---

    pub fn on_drag_over(&mut self, page: PageNumber) -> Vec<Action> {
        self.set_drop_target(Some(page))
    }

    pub fn on_drag_leave(&mut self, page: PageNumber) -> Vec<Action> {
        if self.ui.drop_target == Some(page) { self.set_drop_target(None) } else { Vec::new() }
    }

    /// Drop a dragged product on `page`. Unparsable or unknown ids are
    /// ignored; the zone is cleared either way.
    pub fn on_drop(&mut self, page: PageNumber, payload: &str, now_ms: f64) -> Vec<Action> {
        let mut actions = self.set_drop_target(None);
        if let Some(id) = pages::parse_drop_payload(payload) {
            actions.extend(self.move_product_to_page(id, page, now_ms));
        }
        actions
    }

    fn set_drop_target(&mut self, page: Option<PageNumber>) -> Vec<Action> {
        if self.ui.drop_target == page {
            return Vec::new();
        }
        self.ui.drop_target = page;
        vec![Action::DropTargetChanged { page }, Action::RenderNeeded]
    }

    // --- Selection ---

    /// A click on empty canvas clears the selection.
    pub fn click_canvas(&mut self) -> Vec<Action> {
        self.select(Selection::None)
    }

    fn select(&mut self, selection: Selection) -> Vec<Action> {
        if self.ui.selection == selection {
            return Vec::new();
        }
        self.ui.selection = selection;
        vec![Action::SelectionChanged(selection), Action::RenderNeeded]
    }

    // --- Export ---

    /// Hide editing-only chrome before a page is rasterized.
    pub fn begin_export(&mut self) -> Vec<Action> {
        self.ui.edit_controls_visible = false;
        vec![Action::RenderNeeded]
    }

    /// Show editing-only chrome again.
    pub fn end_export(&mut self) -> Vec<Action> {
        self.ui.edit_controls_visible = true;
        vec![Action::RenderNeeded]
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.ui.selection
    }

    /// What lies under `point` on `page`.
    #[must_use]
    pub fn hit(&self, point: Point, page: PageNumber) -> Option<Target> {
        hit_test(point, &self.store, page, self.ui.selection)
    }

    #[must_use]
    pub fn view(&self) -> BrochureView {
        project(&self.store, &self.ui, self.canvas)
    }

    // --- Pointer input ---

    /// Start a gesture on `target`. Any gesture already in progress is
    /// replaced.
    pub fn on_pointer_down(&mut self, target: Target, point: Point) -> Vec<Action> {
        let session = match target {
            Target::Element { kind } => InteractionSession::DraggingElement { kind },
            Target::Product { id } => match self.store.get(id) {
                Some(item) => InteractionSession::DraggingProduct { id, origin_cell: item.grid_index },
                None => return self.abandon(id),
            },
            Target::ProductRotate { id } => match self.store.position(id) {
                Some(position) => {
                    InteractionSession::RotatingProduct { id, last_angle: angle_deg(product_center(position), point) }
                }
                None => return self.abandon(id),
            },
            Target::ProductResize { id } => match self.store.scale(id) {
                Some(start_scale) => InteractionSession::ResizingProduct { id, start_scale, start_pointer: point },
                None => return self.abandon(id),
            },
            Target::DateLabel { page } => {
                let origin = self.store.date_position(page);
                InteractionSession::DraggingDate { page, grab_offset: Point::new(point.x - origin.x, point.y - origin.y) }
            }
            Target::LogoRotate => {
                InteractionSession::RotatingLogo { last_angle: angle_deg(logo_center(self.store.logo().position), point) }
            }
            Target::LogoResize => {
                InteractionSession::ResizingLogo { start_scale: self.store.logo().scale, start_pointer: point }
            }
        };
        self.session = session;

        match target {
            Target::Product { id } => self.select(Selection::Product { id }),
            Target::Element { kind: ElementKind::Logo } => self.select(Selection::Logo),
            _ => Vec::new(),
        }
    }

    /// Hit-test `point` on `page` and start a gesture on whatever is there.
    /// Empty canvas clears the selection.
    pub fn on_pointer_down_at(&mut self, point: Point, page: PageNumber) -> Vec<Action> {
        match self.hit(point, page) {
            Some(target) => self.on_pointer_down(target, point),
            None => self.click_canvas(),
        }
    }

    /// Update the active gesture. `page` is the page the pointer is over.
    pub fn on_pointer_move(&mut self, point: Point, page: PageNumber) -> Vec<Action> {
        match self.session {
            InteractionSession::Idle => return Vec::new(),
            InteractionSession::DraggingElement { kind } => {
                self.store.set_element_position(kind, centered_clamped(point, ELEMENT_FOOTPRINT, self.canvas));
            }
            InteractionSession::DraggingProduct { id, .. } => {
                if self.store.set_position(id, centered_clamped(point, PRODUCT_FOOTPRINT, self.canvas)).is_err() {
                    return self.abandon(id);
                }
            }
            InteractionSession::RotatingProduct { id, last_angle } => {
                let (Some(position), Some(rotation)) = (self.store.position(id), self.store.rotation(id)) else {
                    return self.abandon(id);
                };
                let angle = angle_deg(product_center(position), point);
                if self.store.set_rotation(id, rotation + (angle - last_angle)).is_err() {
                    return self.abandon(id);
                }
                self.session = InteractionSession::RotatingProduct { id, last_angle: angle };
            }
            InteractionSession::ResizingProduct { id, start_scale, start_pointer } => {
                let factor = resized(start_scale.scale_x, start_pointer, point, PRODUCT_MIN_SCALE);
                if self.store.set_scale(id, Scale::uniform(factor)).is_err() {
                    return self.abandon(id);
                }
            }
            InteractionSession::DraggingDate { page: label_page, grab_offset } => {
                if page != label_page {
                    return Vec::new();
                }
                let position = Point::new(
                    clamp_axis(point.x - grab_offset.x, DATE_LABEL_WIDTH, self.canvas.width),
                    clamp_axis(point.y - grab_offset.y, DATE_LABEL_HEIGHT, self.canvas.height),
                );
                if let Err(e) = self.store.set_date_position(label_page, position) {
                    debug!(error = %e, "date drag abandoned");
                    self.session = InteractionSession::Idle;
                    return Vec::new();
                }
            }
            InteractionSession::RotatingLogo { last_angle } => {
                let logo = self.store.logo();
                let angle = angle_deg(logo_center(logo.position), point);
                self.store.set_logo_rotation(logo.rotation + (angle - last_angle));
                self.session = InteractionSession::RotatingLogo { last_angle: angle };
            }
            InteractionSession::ResizingLogo { start_scale, start_pointer } => {
                self.store.set_logo_scale(resized(start_scale, start_pointer, point, LOGO_MIN_SCALE));
            }
        }
        vec![Action::RenderNeeded]
    }

    /// Finish the active gesture. A product drag snaps to the nearest grid
    /// cell, swapping with a product already resting there.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        let session = std::mem::take(&mut self.session);
        match session {
            InteractionSession::Idle => Vec::new(),
            InteractionSession::DraggingProduct { id, origin_cell } => self.snap_product(id, origin_cell),
            _ => vec![Action::RenderNeeded],
        }
    }

    /// The pointer left the canvas; treated as a release.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.on_pointer_up()
    }

    fn snap_product(&mut self, id: ItemId, origin_cell: Option<usize>) -> Vec<Action> {
        let Some(item) = self.store.get(id) else {
            return self.abandon(id);
        };
        let page = item.page;
        let target = self.grid.nearest_cell(item.position);
        let target_pos = self.grid.cell(target);
        let occupant = self.store.occupant(page, target, Some(id));

        let mut actions = Vec::new();
        if let Some(other) = occupant {
            let swapped = match origin_cell {
                Some(prev) => {
                    let prev_pos = self.grid.cell(prev);
                    self.store
                        .set_grid_index(other, Some(prev))
                        .and_then(|()| self.store.set_position(other, prev_pos))
                        .map(|()| Some(prev_pos))
                }
                None => self.store.set_grid_index(other, None).map(|()| None),
            };
            match swapped {
                Ok(Some(pos)) => {
                    debug!(id, other, cell = target, "products swapped");
                    actions.push(Action::PositionCommitted { id: other, x: pos.x, y: pos.y });
                }
                Ok(None) => debug!(id, other, cell = target, "occupant displaced"),
                Err(e) => debug!(error = %e, "swap skipped"),
            }
        }

        let snapped = self
            .store
            .set_grid_index(id, Some(target))
            .and_then(|()| self.store.set_position(id, target_pos));
        if let Err(e) = snapped {
            debug!(error = %e, "snap abandoned");
            return actions;
        }
        actions.insert(0, Action::PositionCommitted { id, x: target_pos.x, y: target_pos.y });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The product vanished mid-gesture: drop the gesture without touching
    /// the store.
    fn abandon(&mut self, id: ItemId) -> Vec<Action> {
        debug!(id, "product missing; gesture abandoned");
        self.session = InteractionSession::Idle;
        Vec::new()
    }
}

fn product_center(position: Point) -> Point {
    position.offset(PRODUCT_FOOTPRINT / 2.0, PRODUCT_FOOTPRINT / 2.0)
}

fn logo_center(position: Point) -> Point {
    position.offset(LOGO_BASE_SIZE / 2.0, LOGO_BASE_SIZE / 2.0)
}

/// Scale after dragging a resize handle from `start` to `current`.
fn resized(start_scale: f64, start: Point, current: Point, floor: f64) -> f64 {
    let avg = ((current.x - start.x) + (current.y - start.y)) / 2.0;
    (start_scale + avg / RESIZE_SENSITIVITY).max(floor)
}

/// Attribute marking DOM elements that only exist while editing.
pub const EDIT_CONTROL_SELECTOR: &str = "[data-edit-control]";

/// The full layout engine. Wraps `EngineCore` and owns the page element.
pub struct Engine {
    element: HtmlElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to a page element, sized to its client box.
    #[must_use]
    pub fn new(element: HtmlElement, timing: EngineTiming) -> Self {
        let width = f64::from(element.client_width());
        let height = f64::from(element.client_height());
        Self { element, core: EngineCore::with_timing(width, height, timing) }
    }

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    /// Convert client coordinates to page-local ones.
    #[must_use]
    pub fn to_local(&self, client_x: f64, client_y: f64) -> Point {
        let rect = self.element.get_bounding_client_rect();
        Point::new(client_x - rect.left(), client_y - rect.top())
    }

    /// Re-measure the element after a layout change.
    pub fn measure(&mut self) -> Vec<Action> {
        let width = f64::from(self.element.client_width());
        let height = f64::from(self.element.client_height());
        self.core.set_canvas_size(width, height)
    }

    pub fn tick(&mut self) -> Vec<Action> {
        self.core.tick(Self::now_ms())
    }

    pub fn sync_products(&mut self, seeds: &[ItemSeed]) -> Vec<Action> {
        self.core.sync_products(seeds, Self::now_ms())
    }

    pub fn enter_design_mode(&mut self, page_count: PageNumber) -> Vec<Action> {
        self.core.enter_design_mode(page_count, Self::now_ms())
    }

    pub fn add_page(&mut self) -> Vec<Action> {
        self.core.add_page(Self::now_ms())
    }

    pub fn remove_page(&mut self) -> Vec<Action> {
        self.core.remove_page(Self::now_ms())
    }

    pub fn set_page_count(&mut self, page_count: PageNumber) -> Vec<Action> {
        self.core.set_page_count(page_count, Self::now_ms())
    }

    pub fn on_drop(&mut self, page: PageNumber, payload: &str) -> Vec<Action> {
        self.core.on_drop(page, payload, Self::now_ms())
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, client_x: f64, client_y: f64, page: PageNumber) -> Vec<Action> {
        let point = self.to_local(client_x, client_y);
        self.core.on_pointer_down_at(point, page)
    }

    pub fn on_target_down(&mut self, target: Target, client_x: f64, client_y: f64) -> Vec<Action> {
        let point = self.to_local(client_x, client_y);
        self.core.on_pointer_down(target, point)
    }

    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64, page: PageNumber) -> Vec<Action> {
        let point = self.to_local(client_x, client_y);
        self.core.on_pointer_move(point, page)
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.core.on_pointer_up()
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    /// Current view as JSON for the page script.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the view cannot be encoded.
    pub fn view_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.core.view())
    }

    // --- Export ---

    /// Hide or show every edit-only element under the page element.
    ///
    /// # Errors
    ///
    /// Returns the DOM error if the selector query fails.
    pub fn set_edit_controls_visible(&mut self, visible: bool) -> Result<Vec<Action>, JsValue> {
        let nodes = self.element.query_selector_all(EDIT_CONTROL_SELECTOR)?;
        let value = if visible { "visible" } else { "hidden" };
        for i in 0..nodes.length() {
            if let Some(node) = nodes.item(i)
                && let Ok(el) = node.dyn_into::<HtmlElement>()
            {
                el.style().set_property("visibility", value)?;
            }
        }
        Ok(if visible { self.core.end_export() } else { self.core.begin_export() })
    }
}
