//! Deadline-based debouncer driven by host time.
//!
//! The canvas core has no clock of its own. Callers pass `now_ms` (for
//! example `js_sys::Date::now()`) when scheduling and polling; scheduling
//! again before the deadline replaces it, so the last request wins.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

/// A single pending deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Debouncer {
    deadline_ms: Option<f64>,
}

impl Debouncer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the debouncer to fire `delay_ms` after `now_ms`, replacing any
    /// pending deadline.
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) {
        self.deadline_ms = Some(now_ms + delay_ms.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Whether the deadline has passed at `now_ms`, without consuming it.
    #[must_use]
    pub fn is_due(&self, now_ms: f64) -> bool {
        self.deadline_ms.is_some_and(|deadline| now_ms >= deadline)
    }

    /// Consume the deadline if it has passed. Returns true exactly once per
    /// scheduled deadline.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if self.is_due(now_ms) {
            self.deadline_ms = None;
            true
        } else {
            false
        }
    }
}
