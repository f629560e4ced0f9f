//! Wire records exchanged with the record store.
//!
//! Field names serialize in camelCase; nullable fields serialize as `null`.

#[cfg(test)]
#[path = "records_test.rs"]
mod records_test;

use brochure_canvas::geom::Point;
use brochure_canvas::store::{ItemSeed, PageNumber, Scale};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Integer id shared by every record kind.
pub type RecordId = i64;

/// Prefix under which uploaded files are served.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// URL of an uploaded file.
#[must_use]
pub fn upload_url(file_path: &str) -> String {
    format!("{UPLOADS_PREFIX}{}", file_path.trim_start_matches('/'))
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
}

// =============================================================================
// Campaigns
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub status: CampaignStatus,
    pub user_id: RecordId,
    pub template_id: Option<RecordId>,
    pub logo_id: Option<RecordId>,
    pub company_name: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    /// Free-form "valid until" line printed on the brochure.
    pub valid_until: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to draft when absent.
    pub status: Option<CampaignStatus>,
    pub user_id: RecordId,
    pub template_id: Option<RecordId>,
    pub logo_id: Option<RecordId>,
    pub company_name: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    /// Free-form "valid until" line printed on the brochure.
    pub valid_until: Option<String>,
    /// Number of pages in the brochure when it was saved.
    pub page_count: Option<PageNumber>,
}

/// Partial campaign update; `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<CampaignStatus>,
    pub template_id: Option<RecordId>,
    pub logo_id: Option<RecordId>,
    pub company_name: Option<String>,
    pub valid_until: Option<String>,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub original_price: f64,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub original_price: f64,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub original_price: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// Campaign products
// =============================================================================

/// A product placed in a campaign, with its saved placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignProduct {
    pub id: RecordId,
    pub campaign_id: RecordId,
    pub product_id: RecordId,
    pub quantity: u32,
    pub discount_percent: f64,
    pub new_price: f64,
    pub position_x: f64,
    pub position_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    pub page_number: PageNumber,
}

impl CampaignProduct {
    /// Seed for the layout engine, keyed by the placed product's id.
    ///
    /// A `(0, 0)` position is treated as "never placed" by the engine.
    #[must_use]
    pub fn to_seed(&self) -> ItemSeed {
        ItemSeed {
            id: self.product_id,
            position: Some(Point::new(self.position_x, self.position_y)),
            rotation: Some(self.rotation),
            scale: Some(Scale { scale_x: self.scale_x, scale_y: self.scale_y }),
            page: Some(self.page_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaignProduct {
    pub campaign_id: RecordId,
    pub product_id: RecordId,
    /// Defaults to 1.
    pub quantity: Option<u32>,
    /// Defaults to 0.
    pub discount_percent: Option<f64>,
    pub new_price: f64,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub rotation: Option<f64>,
    pub page_number: Option<PageNumber>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignProductPatch {
    pub quantity: Option<u32>,
    pub discount_percent: Option<f64>,
    pub new_price: Option<f64>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub rotation: Option<f64>,
    pub page_number: Option<PageNumber>,
}

// =============================================================================
// Templates and logos
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    pub user_id: RecordId,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl Template {
    #[must_use]
    pub fn background_url(&self) -> String {
        upload_url(&self.file_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    pub user_id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    pub id: RecordId,
    pub name: String,
    pub file_path: String,
    pub is_active: bool,
    pub user_id: RecordId,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLogo {
    pub name: String,
    pub file_path: String,
    #[serde(default)]
    pub is_active: bool,
    pub user_id: RecordId,
}
