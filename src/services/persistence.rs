//! Persistence service: committed product positions waiting to be written.
//!
//! DESIGN
//! ======
//! The engine reports `PositionCommitted` whenever a product comes to rest.
//! Those positions are queued here keyed by product, last write wins, and
//! flushed to the record store as campaign-product position updates.
//!
//! ERROR HANDLING
//! ==============
//! Entries are cleared only after a successful write. Retryable failures
//! are retried with linear back-off; anything still failing stays queued
//! for the next flush and is reported to the caller.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::collections::BTreeMap;
use std::time::Duration;

use brochure_canvas::geom::Point;
use brochure_canvas::store::ItemId;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::error::{ErrorCode, Notification};
use crate::records::RecordId;
use crate::services::storage::{Storage, StorageError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistenceError {
    #[error("position of product {id} not saved: {source}")]
    Write { id: ItemId, source: StorageError },
}

impl ErrorCode for PersistenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Write { .. } => "E_POSITION_NOT_SAVED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Write { source, .. } => source.retryable(),
        }
    }
}

impl PersistenceError {
    #[must_use]
    pub fn notification(&self) -> Notification {
        Notification::from_error("Position not saved", self)
    }
}

/// Retry policy for position writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushConfig {
    /// Attempts per write, at least one.
    pub retries: usize,
    /// Base delay in milliseconds; attempt `n` waits `n * retry_base_ms`.
    pub retry_base_ms: u64,
}

impl From<&EditorConfig> for FlushConfig {
    fn from(config: &EditorConfig) -> Self {
        Self { retries: config.flush_retries, retry_base_ms: config.flush_retry_base_ms }
    }
}

/// Outcome of one flush.
#[derive(Debug, Default, PartialEq)]
pub struct FlushReport {
    /// Positions written and dequeued.
    pub written: usize,
    /// Positions dropped because no saved record exists for the product.
    pub skipped: usize,
    /// Writes that failed; their entries remain queued.
    pub failed: Vec<PersistenceError>,
}

impl FlushReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Queue of committed positions not yet written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingPositions {
    entries: BTreeMap<ItemId, Point>,
}

impl PendingPositions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `id` at `(x, y)`, replacing any earlier unwritten position.
    pub fn record(&mut self, id: ItemId, x: f64, y: f64) {
        self.entries.insert(id, Point::new(x, y));
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<Point> {
        self.entries.get(&id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write every queued position whose product has a saved record.
    ///
    /// `record_ids` maps product ids to campaign-product record ids.
    pub async fn flush<S>(
        &mut self,
        storage: &S,
        record_ids: &BTreeMap<ItemId, RecordId>,
        config: FlushConfig,
    ) -> FlushReport
    where
        S: Storage + ?Sized,
    {
        let mut report = FlushReport::default();
        if self.entries.is_empty() {
            return report;
        }

        let snapshot: Vec<(ItemId, Point)> = self.entries.iter().map(|(id, p)| (*id, *p)).collect();
        for (id, position) in snapshot {
            let Some(&record_id) = record_ids.get(&id) else {
                debug!(id, "no saved record for product; dropping position");
                self.entries.remove(&id);
                report.skipped += 1;
                continue;
            };

            match write_with_retry(storage, record_id, position, config).await {
                Ok(()) => {
                    self.entries.remove(&id);
                    report.written += 1;
                }
                Err(source) => {
                    warn!(error = %source, id, record_id, "position write failed; keeping for retry");
                    report.failed.push(PersistenceError::Write { id, source });
                }
            }
        }

        info!(
            written = report.written,
            skipped = report.skipped,
            failed = report.failed.len(),
            "positions flushed"
        );
        report
    }
}

async fn write_with_retry<S>(
    storage: &S,
    record_id: RecordId,
    position: Point,
    config: FlushConfig,
) -> Result<(), StorageError>
where
    S: Storage + ?Sized,
{
    let attempts = config.retries.max(1);
    let mut attempt = 1;
    loop {
        match storage.update_campaign_product_position(record_id, position.x, position.y).await {
            Ok(_) => return Ok(()),
            Err(e) if e.retryable() && attempt < attempts => {
                warn!(error = %e, attempt, total = attempts, record_id, "position write failed; retrying");
                tokio::time::sleep(Duration::from_millis((attempt as u64) * config.retry_base_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
