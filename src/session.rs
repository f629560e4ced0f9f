//! Editing session: one brochure open in the editor.
//!
//! Owns the layout engine and connects it to the record store. Engine
//! handlers are run through [`EditorSession::apply`] so committed positions
//! are queued for persistence as they happen. Failures never escape as
//! panics; they become notifications the host drains and shows.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::BTreeMap;
use std::sync::Arc;

use brochure_canvas::engine::{Action, EngineCore};
use brochure_canvas::projection::BrochureView;
use brochure_canvas::store::{ItemId, PageNumber};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::error::Notification;
use crate::records::RecordId;
use crate::services::campaign::{self, CampaignDraft, CampaignError, LoadedCampaign, SavedCampaign};
use crate::services::export::{self, ExportBundle, ExportError, ExportFormat, PageRenderer};
use crate::services::persistence::{FlushConfig, FlushReport, PendingPositions};
use crate::services::storage::Storage;

/// Outcome of [`EditorSession::export`].
#[derive(Debug)]
pub struct ExportRun {
    pub actions: Vec<Action>,
    pub result: Result<ExportBundle, ExportError>,
}

pub struct EditorSession<S: ?Sized> {
    core: EngineCore,
    storage: Arc<S>,
    config: EditorConfig,
    pending: PendingPositions,
    /// Product id to campaign-product record id for the open campaign.
    record_ids: BTreeMap<ItemId, RecordId>,
    campaign_id: Option<RecordId>,
    notifications: Vec<Notification>,
}

impl<S> EditorSession<S>
where
    S: Storage + ?Sized,
{
    #[must_use]
    pub fn new(storage: Arc<S>, config: EditorConfig) -> Self {
        let canvas = config.canvas_size();
        let core = EngineCore::with_timing(canvas.width, canvas.height, config.timing());
        info!(width = canvas.width, height = canvas.height, design_mode = config.design_mode, "editor session opened");
        Self {
            core,
            storage,
            config,
            pending: PendingPositions::new(),
            record_ids: BTreeMap::new(),
            campaign_id: None,
            notifications: Vec::new(),
        }
    }

    // --- Engine access ---

    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    #[must_use]
    pub fn view(&self) -> BrochureView {
        self.core.view()
    }

    /// Run an engine handler and record what it committed.
    pub fn apply<F>(&mut self, handler: F) -> Vec<Action>
    where
        F: FnOnce(&mut EngineCore) -> Vec<Action>,
    {
        let actions = handler(&mut self.core);
        self.record(&actions);
        actions
    }

    fn record(&mut self, actions: &[Action]) {
        for action in actions {
            if let Action::PositionCommitted { id, x, y } = *action {
                self.pending.record(id, x, y);
            }
        }
    }

    /// Advance host time; runs a due auto-layout.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        self.apply(|core| core.tick(now_ms))
    }

    /// Enter design mode using the configured page count.
    pub fn enter_design_mode(&mut self, page_count: PageNumber, now_ms: f64) -> Vec<Action> {
        let canvas = EditorConfig { design_mode: true, ..self.config }.canvas_size();
        let mut actions = self.apply(|core| core.set_canvas_size(canvas.width, canvas.height));
        actions.extend(self.apply(|core| core.enter_design_mode(page_count, now_ms)));
        actions
    }

    /// Arrange every product right away and tell the user.
    pub fn apply_smart_layout(&mut self) -> Vec<Action> {
        let actions = self.apply(EngineCore::run_auto_layout);
        self.notifications.push(Notification::info(
            "Smart Layout Applied",
            "Products automatically arranged with optimal sizing and spacing for perfect visual balance.",
        ));
        actions
    }

    // --- Campaign ---

    #[must_use]
    pub fn campaign_id(&self) -> Option<RecordId> {
        self.campaign_id
    }

    /// Save the brochure as a new campaign.
    ///
    /// Queued positions are dropped on success: the saved records already
    /// carry every current placement.
    ///
    /// # Errors
    ///
    /// Any [`CampaignError`]; a notification is queued as well.
    pub async fn save(&mut self, draft: &CampaignDraft) -> Result<SavedCampaign, CampaignError> {
        match campaign::save_campaign(&*self.storage, draft, &self.core.store).await {
            Ok(saved) => {
                self.campaign_id = Some(saved.campaign.id);
                self.record_ids = saved.products.iter().map(|p| (p.product_id, p.id)).collect();
                self.pending.clear();
                self.notifications.push(saved.notification());
                Ok(saved)
            }
            Err(e) => {
                self.notifications.push(e.save_notification());
                Err(e)
            }
        }
    }

    /// Open a saved campaign and seed the engine with its placements.
    ///
    /// # Errors
    ///
    /// Any [`CampaignError`]; a notification is queued as well.
    pub async fn load(&mut self, campaign_id: RecordId, now_ms: f64) -> Result<LoadedCampaign, CampaignError> {
        match campaign::load_campaign(&*self.storage, campaign_id).await {
            Ok(loaded) => {
                let seeds = loaded.seeds();
                self.apply(|core| core.sync_products(&seeds, now_ms));
                self.campaign_id = Some(campaign_id);
                self.record_ids = loaded.record_ids();
                self.pending.clear();
                Ok(loaded)
            }
            Err(e) => {
                self.notifications.push(e.load_notification());
                Err(e)
            }
        }
    }

    // --- Persistence ---

    /// Committed positions not yet written.
    #[must_use]
    pub fn pending(&self) -> &PendingPositions {
        &self.pending
    }

    /// Write queued positions to the open campaign. Without one there is
    /// nowhere to write, so the queue is left as is.
    pub async fn flush(&mut self) -> FlushReport {
        if self.campaign_id.is_none() {
            debug!(pending = self.pending.len(), "no campaign open; flush skipped");
            return FlushReport::default();
        }
        let report = self.pending.flush(&*self.storage, &self.record_ids, FlushConfig::from(&self.config)).await;
        self.notifications.extend(report.failed.iter().map(|e| e.notification()));
        report
    }

    // --- Export ---

    /// Export every page in `format` (`png`, `jpeg`).
    ///
    /// Edit controls are hidden for the duration of the render and restored
    /// whether or not it succeeds; both toggles go through [`Self::apply`],
    /// so the returned actions include their redraws. A notification is
    /// queued for the outcome.
    pub async fn export<R>(&mut self, renderer: &R, format: &str) -> ExportRun
    where
        R: PageRenderer + ?Sized,
    {
        let (actions, result) = match format.parse::<ExportFormat>() {
            Ok(format) => {
                let mut actions = self.apply(EngineCore::begin_export);
                let result = export::render_pages(&self.core.view(), renderer, format).await;
                actions.extend(self.apply(EngineCore::end_export));
                (actions, result)
            }
            Err(e) => (Vec::new(), Err(e)),
        };
        self.notifications.push(match &result {
            Ok(bundle) => bundle.notification(),
            Err(e) => e.notification(),
        });
        ExportRun { actions, result }
    }

    // --- Notifications ---

    /// Take every notification queued since the last call.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
