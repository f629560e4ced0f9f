//! Shared numeric constants for the canvas crate.

// ── Page bands ──────────────────────────────────────────────────

/// Left and right margin kept clear of products, in canvas pixels.
pub const MARGIN_X: f64 = 40.0;

/// Height of the header strip at the top of every page.
pub const HEADER_HEIGHT: f64 = 120.0;

/// Height of the banner strip directly below the header.
pub const BANNER_HEIGHT: f64 = 44.0;

/// Height of the footer strip at the bottom of every page.
pub const FOOTER_HEIGHT: f64 = 80.0;

/// Breathing room between a band and the product area.
pub const BAND_PADDING: f64 = 16.0;

/// First y coordinate available to products (header + banner + padding).
pub const GRID_TOP: f64 = HEADER_HEIGHT + BANNER_HEIGHT + BAND_PADDING;

/// Space reserved at the bottom of the page (footer + padding).
pub const GRID_BOTTOM_OFFSET: f64 = FOOTER_HEIGHT + BAND_PADDING;

// ── Fixed grid ──────────────────────────────────────────────────

/// Columns in the fixed placement grid.
pub const FIXED_COLS: usize = 3;

/// Rows in the fixed placement grid.
pub const FIXED_ROWS: usize = 3;

/// Number of cells in the fixed placement grid; also the page capacity used
/// when distributing products across pages.
pub const CELL_COUNT: usize = FIXED_COLS * FIXED_ROWS;

/// Gap between fixed-grid cells.
pub const FIXED_GAP: f64 = 14.0;

// ── Dynamic layout ──────────────────────────────────────────────

/// Smallest gap auto-layout leaves between neighbouring products.
pub const AUTO_MIN_GAP: f64 = 20.0;

/// Hard floor for the auto-layout item size.
pub const MIN_ITEM_SIZE: f64 = 90.0;

// ── Footprints ──────────────────────────────────────────────────

/// Product footprint (image plus price tag) used for drag clamping.
pub const PRODUCT_FOOTPRINT: f64 = 132.0;

/// Base edge length of the logo before scaling.
pub const LOGO_BASE_SIZE: f64 = 64.0;

/// Footprint used when dragging a free element (logo, company name).
pub const ELEMENT_FOOTPRINT: f64 = 50.0;

/// Width of a date label.
pub const DATE_LABEL_WIDTH: f64 = 120.0;

/// Height of a date label.
pub const DATE_LABEL_HEIGHT: f64 = 30.0;

// ── Transforms ──────────────────────────────────────────────────

/// Pointer travel (averaged over both axes) that adds 1.0 to the scale.
pub const RESIZE_SENSITIVITY: f64 = 150.0;

/// Smallest scale a product can be resized to.
pub const PRODUCT_MIN_SCALE: f64 = 0.1;

/// Smallest scale the logo can be resized to.
pub const LOGO_MIN_SCALE: f64 = 0.2;

// ── Defaults ────────────────────────────────────────────────────

/// Default logo position.
pub const DEFAULT_LOGO_POS: (f64, f64) = (32.0, 32.0);

/// Default company-name position.
pub const DEFAULT_COMPANY_NAME_POS: (f64, f64) = (112.0, 32.0);

/// Default date-label position on every page.
pub const DEFAULT_DATE_POS: (f64, f64) = (320.0, 20.0);

/// Preview canvas size.
pub const PREVIEW_CANVAS: (f64, f64) = (600.0, 800.0);

/// Design-mode canvas size.
pub const DESIGN_CANVAS: (f64, f64) = (400.0, 533.0);

/// Smallest canvas the geometry engine works with. Degenerate dimensions are
/// raised to this size so no computed position is ever NaN or infinite, and a
/// product footprint always fits on the canvas. Far grid cells can still sit
/// closer than a footprint to the edge; resting positions are clamped.
pub const MIN_CANVAS_WIDTH: f64 = 2.0 * MARGIN_X + PRODUCT_FOOTPRINT;

/// See [`MIN_CANVAS_WIDTH`].
pub const MIN_CANVAS_HEIGHT: f64 = GRID_TOP + GRID_BOTTOM_OFFSET + PRODUCT_FOOTPRINT;

// ── Timing ──────────────────────────────────────────────────────

/// Debounce applied when the product set or page count changes.
pub const AUTO_LAYOUT_DEBOUNCE_MS: f64 = 50.0;

/// Delay before the first auto-layout after entering design mode.
pub const DESIGN_ENTRY_DELAY_MS: f64 = 100.0;

// ── Handles ─────────────────────────────────────────────────────

/// Pick radius around a rotate or resize handle.
pub const HANDLE_RADIUS_PX: f64 = 8.0;
