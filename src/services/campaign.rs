//! Campaign service: save the designed brochure as a campaign, load a saved
//! campaign back into the engine, and the labels shown around it.
//!
//! DESIGN
//! ======
//! Saving creates the campaign record first, then one campaign-product per
//! selected product carrying the placement the engine currently holds
//! (position, page, scale, rotation). Engine item ids are product ids, so a
//! loaded campaign seeds the engine keyed by `product_id`.
//!
//! ERROR HANDLING
//! ==============
//! An empty name is rejected before any storage call. Storage failures are
//! surfaced as destructive notifications; nothing is rolled back.

#[cfg(test)]
#[path = "campaign_test.rs"]
mod campaign_test;

use std::collections::BTreeMap;

use brochure_canvas::store::{ItemSeed, PageNumber, PlacementStore, Scale};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use crate::error::{ErrorCode, Notification};
use crate::records::{
    Campaign, CampaignProduct, CampaignStatus, NewCampaign, NewCampaignProduct, RecordId, Template,
};
use crate::services::storage::{Storage, StorageError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("campaign name is empty")]
    NameRequired,
    #[error("campaign not found: {0}")]
    NotFound(RecordId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ErrorCode for CampaignError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NameRequired => "E_CAMPAIGN_NAME_REQUIRED",
            Self::NotFound(_) => "E_CAMPAIGN_NOT_FOUND",
            Self::Storage(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Storage(e) if e.retryable())
    }
}

impl CampaignError {
    /// Toast shown when a save fails.
    #[must_use]
    pub fn save_notification(&self) -> Notification {
        match self {
            Self::NameRequired => {
                Notification::destructive("Campaign name required", "Please enter a name for your campaign.")
            }
            _ => Notification {
                code: Some(self.error_code()),
                ..Notification::destructive("Campaign creation failed", "There was an error creating your campaign.")
            },
        }
    }

    /// Toast shown when a load fails.
    #[must_use]
    pub fn load_notification(&self) -> Notification {
        Notification::from_error("Campaign could not be loaded", self)
    }
}

/// A product picked for the brochure, with its pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedProduct {
    pub product_id: RecordId,
    pub quantity: u32,
    pub discount_percent: f64,
    pub new_price: f64,
}

/// Everything the editor knows about a campaign before it is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignDraft {
    pub user_id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
    pub logo_id: Option<RecordId>,
    /// Template chosen for the whole brochure.
    pub selected_template_id: Option<RecordId>,
    /// Per-page template overrides; `None` means "use the brochure template".
    pub page_templates: BTreeMap<PageNumber, Option<RecordId>>,
    pub products: Vec<SelectedProduct>,
}

impl CampaignDraft {
    /// Template recorded on the campaign: the first page override that is
    /// set, or the brochure template when no page has an entry.
    #[must_use]
    pub fn campaign_template_id(&self) -> Option<RecordId> {
        if self.page_templates.is_empty() {
            self.selected_template_id
        } else {
            self.page_templates.values().find_map(|id| *id)
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCampaign {
    pub campaign: Campaign,
    pub products: Vec<CampaignProduct>,
}

impl SavedCampaign {
    #[must_use]
    pub fn notification(&self) -> Notification {
        Notification::info("Campaign created successfully", "Your campaign has been saved with all product positions.")
    }
}

/// A saved campaign ready to seed the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCampaign {
    pub campaign: Campaign,
    pub products: Vec<CampaignProduct>,
}

impl LoadedCampaign {
    #[must_use]
    pub fn seeds(&self) -> Vec<ItemSeed> {
        self.products.iter().map(CampaignProduct::to_seed).collect()
    }

    /// Pages needed to show every saved product (at least one).
    #[must_use]
    pub fn page_count(&self) -> PageNumber {
        self.products.iter().map(|p| p.page_number).max().unwrap_or(1).max(1)
    }

    /// Engine item id (product id) to campaign-product record id.
    #[must_use]
    pub fn record_ids(&self) -> BTreeMap<RecordId, RecordId> {
        self.products.iter().map(|p| (p.product_id, p.id)).collect()
    }
}

// =============================================================================
// SAVE / LOAD
// =============================================================================

/// Create a campaign from `draft` with every product's current placement.
///
/// # Errors
///
/// `NameRequired` for a blank name (no storage call is made), otherwise the
/// first storage failure.
pub async fn save_campaign<S>(
    storage: &S,
    draft: &CampaignDraft,
    placements: &PlacementStore,
) -> Result<SavedCampaign, CampaignError>
where
    S: Storage + ?Sized,
{
    if draft.name.trim().is_empty() {
        return Err(CampaignError::NameRequired);
    }

    let campaign = storage
        .create_campaign(NewCampaign {
            name: draft.name.clone(),
            description: draft.description.clone().filter(|d| !d.is_empty()),
            status: Some(CampaignStatus::Active),
            user_id: draft.user_id,
            template_id: draft.campaign_template_id(),
            logo_id: draft.logo_id,
            company_name: draft.company_name.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            valid_until: None,
            page_count: Some(placements.page_count()),
        })
        .await?;

    let mut products = Vec::with_capacity(draft.products.len());
    for selected in &draft.products {
        let item = placements.get(selected.product_id);
        let position = item.map(|i| i.position).unwrap_or_default();
        let scale = item.map_or_else(Scale::default, |i| i.scale);
        let placed = storage
            .create_campaign_product(NewCampaignProduct {
                campaign_id: campaign.id,
                product_id: selected.product_id,
                quantity: Some(selected.quantity),
                discount_percent: Some(selected.discount_percent),
                new_price: selected.new_price,
                position_x: Some(position.x),
                position_y: Some(position.y),
                scale_x: Some(scale.scale_x),
                scale_y: Some(scale.scale_y),
                rotation: Some(item.map_or(0.0, |i| i.rotation)),
                page_number: Some(item.map_or(1, |i| i.page)),
            })
            .await
            .inspect_err(|e| warn!(error = %e, campaign_id = campaign.id, "campaign product save failed"))?;
        products.push(placed);
    }

    info!(campaign_id = campaign.id, products = products.len(), "campaign saved");
    Ok(SavedCampaign { campaign, products })
}

/// Read a saved campaign and its placed products.
///
/// # Errors
///
/// `NotFound` when the campaign does not exist, or a storage failure.
pub async fn load_campaign<S>(storage: &S, campaign_id: RecordId) -> Result<LoadedCampaign, CampaignError>
where
    S: Storage + ?Sized,
{
    let campaign = storage.get_campaign(campaign_id).await?.ok_or(CampaignError::NotFound(campaign_id))?;
    let products = storage.list_campaign_products(campaign_id).await?;
    info!(campaign_id, products = products.len(), "campaign loaded");
    Ok(LoadedCampaign { campaign, products })
}

// =============================================================================
// LABELS
// =============================================================================

/// Background image for `page`: its own template when one is set and known,
/// else the brochure template. `None` means the default gradient.
#[must_use]
pub fn template_background_url(
    page: PageNumber,
    page_templates: &BTreeMap<PageNumber, Option<RecordId>>,
    selected_template_id: Option<RecordId>,
    templates: &[Template],
) -> Option<String> {
    let find = |id: RecordId| templates.iter().find(|t| t.id == id && !t.file_path.is_empty());
    page_templates
        .get(&page)
        .copied()
        .flatten()
        .and_then(find)
        .or_else(|| selected_template_id.and_then(find))
        .map(Template::background_url)
}

/// Label for the campaign's validity window.
#[must_use]
pub fn format_date_range(start: Option<Date>, end: Option<Date>) -> String {
    let full = format_description!("[month repr:short] [day], [year]");
    let short = format_description!("[month repr:short] [day]");

    match (start, end) {
        (None, None) => "Select dates".to_string(),
        (Some(start), None) => format!("From {}", format_date(start, full)),
        (None, Some(end)) => format!("Until {}", format_date(end, full)),
        (Some(start), Some(end)) => format!("{} - {}", format_date(start, short), format_date(end, full)),
    }
}

fn format_date(date: Date, description: &[BorrowedFormatItem<'_>]) -> String {
    date.format(description).unwrap_or_default()
}
