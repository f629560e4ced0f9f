//! Editor configuration, loaded from environment variables.
//!
//! Every knob has a `DEFAULT_*` constant; unset or unparsable variables fall
//! back to it.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use brochure_canvas::consts::{AUTO_LAYOUT_DEBOUNCE_MS, DESIGN_CANVAS, DESIGN_ENTRY_DELAY_MS, PREVIEW_CANVAS};
use brochure_canvas::engine::EngineTiming;
use brochure_canvas::geom::CanvasSize;

pub(crate) const DEFAULT_CANVAS_WIDTH: f64 = PREVIEW_CANVAS.0;
pub(crate) const DEFAULT_CANVAS_HEIGHT: f64 = PREVIEW_CANVAS.1;
pub(crate) const DEFAULT_DESIGN_MODE: bool = false;
pub(crate) const DEFAULT_AUTO_LAYOUT_DEBOUNCE_MS: f64 = AUTO_LAYOUT_DEBOUNCE_MS;
pub(crate) const DEFAULT_DESIGN_ENTRY_DELAY_MS: f64 = DESIGN_ENTRY_DELAY_MS;
pub(crate) const DEFAULT_FLUSH_RETRIES: usize = 2;
pub(crate) const DEFAULT_FLUSH_RETRY_BASE_MS: u64 = 20;

/// Tuning knobs for an editing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Preview canvas width. Ignored in design mode.
    pub canvas_width: f64,
    /// Preview canvas height. Ignored in design mode.
    pub canvas_height: f64,
    /// Start in the compact design canvas.
    pub design_mode: bool,
    pub auto_layout_debounce_ms: f64,
    pub design_entry_delay_ms: f64,
    /// Attempts per position write before giving up.
    pub flush_retries: usize,
    /// Base delay in milliseconds for linear retry back-off.
    pub flush_retry_base_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            design_mode: DEFAULT_DESIGN_MODE,
            auto_layout_debounce_ms: DEFAULT_AUTO_LAYOUT_DEBOUNCE_MS,
            design_entry_delay_ms: DEFAULT_DESIGN_ENTRY_DELAY_MS,
            flush_retries: DEFAULT_FLUSH_RETRIES,
            flush_retry_base_ms: DEFAULT_FLUSH_RETRY_BASE_MS,
        }
    }
}

impl EditorConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            canvas_width: env_parse("BROCHURE_CANVAS_WIDTH", DEFAULT_CANVAS_WIDTH),
            canvas_height: env_parse("BROCHURE_CANVAS_HEIGHT", DEFAULT_CANVAS_HEIGHT),
            design_mode: env_parse("BROCHURE_DESIGN_MODE", DEFAULT_DESIGN_MODE),
            auto_layout_debounce_ms: env_parse("BROCHURE_AUTO_LAYOUT_DEBOUNCE_MS", DEFAULT_AUTO_LAYOUT_DEBOUNCE_MS),
            design_entry_delay_ms: env_parse("BROCHURE_DESIGN_ENTRY_DELAY_MS", DEFAULT_DESIGN_ENTRY_DELAY_MS),
            flush_retries: env_parse("BROCHURE_FLUSH_RETRIES", DEFAULT_FLUSH_RETRIES).max(1),
            flush_retry_base_ms: env_parse("BROCHURE_FLUSH_RETRY_BASE_MS", DEFAULT_FLUSH_RETRY_BASE_MS),
        }
    }

    /// Canvas the engine should use: the fixed design canvas in design mode,
    /// the configured preview canvas otherwise.
    #[must_use]
    pub fn canvas_size(&self) -> CanvasSize {
        if self.design_mode {
            CanvasSize::clamped(DESIGN_CANVAS.0, DESIGN_CANVAS.1)
        } else {
            CanvasSize::clamped(self.canvas_width, self.canvas_height)
        }
    }

    #[must_use]
    pub fn timing(&self) -> EngineTiming {
        EngineTiming {
            auto_layout_debounce_ms: self.auto_layout_debounce_ms,
            design_entry_delay_ms: self.design_entry_delay_ms,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
