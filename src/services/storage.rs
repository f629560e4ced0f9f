//! Record store: the persistence collaborator behind the editor.
//!
//! DESIGN
//! ======
//! `Storage` is the CRUD surface the session talks to. Every record kind is
//! keyed by an integer id handed out by the store, increasing monotonically
//! per kind from 1. `MemStorage` keeps everything in maps behind one tokio
//! `RwLock`; it is the reference implementation and the test double.
//!
//! ERROR HANDLING
//! ==============
//! Lookups return `Ok(None)` for a missing id; updates of a missing id
//! return `StorageError::NotFound`. Deletes report whether anything was
//! removed. Backends that can fail transiently report
//! `StorageError::Unavailable`, which callers may retry.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;

use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ErrorCode;
use crate::records::{
    Campaign, CampaignPatch, CampaignProduct, CampaignProductPatch, Logo, NewCampaign, NewCampaignProduct, NewLogo,
    NewProduct, NewTemplate, NewUser, Product, ProductPatch, RecordId, Template, User,
};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: RecordId },
    #[error("invalid record: {0}")]
    Invalid(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Invalid(_) => "E_INVALID_RECORD",
            Self::Unavailable(_) => "E_STORAGE_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// CRUD over users, campaigns, products, campaign products, templates and logos.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // --- users ---

    async fn get_user(&self, id: RecordId) -> StorageResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;

    // --- campaigns ---

    async fn list_campaigns(&self, user_id: RecordId) -> StorageResult<Vec<Campaign>>;
    async fn get_campaign(&self, id: RecordId) -> StorageResult<Option<Campaign>>;
    async fn create_campaign(&self, campaign: NewCampaign) -> StorageResult<Campaign>;
    async fn update_campaign(&self, id: RecordId, patch: CampaignPatch) -> StorageResult<Campaign>;
    async fn delete_campaign(&self, id: RecordId) -> StorageResult<bool>;

    // --- products ---

    /// Products matching `search` (case-insensitive, name or description)
    /// and `category` (`"all"` matches every category).
    async fn list_products(&self, search: Option<&str>, category: Option<&str>) -> StorageResult<Vec<Product>>;
    async fn get_product(&self, id: RecordId) -> StorageResult<Option<Product>>;
    async fn create_product(&self, product: NewProduct) -> StorageResult<Product>;
    async fn update_product(&self, id: RecordId, patch: ProductPatch) -> StorageResult<Product>;
    async fn delete_product(&self, id: RecordId) -> StorageResult<bool>;

    // --- campaign products ---

    async fn list_campaign_products(&self, campaign_id: RecordId) -> StorageResult<Vec<CampaignProduct>>;
    async fn create_campaign_product(&self, placed: NewCampaignProduct) -> StorageResult<CampaignProduct>;
    async fn update_campaign_product(
        &self,
        id: RecordId,
        patch: CampaignProductPatch,
    ) -> StorageResult<CampaignProduct>;
    async fn delete_campaign_product(&self, id: RecordId) -> StorageResult<bool>;

    /// Persist a new resting position for a placed product.
    async fn update_campaign_product_position(&self, id: RecordId, x: f64, y: f64) -> StorageResult<CampaignProduct> {
        let patch = CampaignProductPatch { position_x: Some(x), position_y: Some(y), ..CampaignProductPatch::default() };
        self.update_campaign_product(id, patch).await
    }

    // --- templates ---

    async fn list_templates(&self, user_id: RecordId) -> StorageResult<Vec<Template>>;
    async fn get_template(&self, id: RecordId) -> StorageResult<Option<Template>>;
    async fn create_template(&self, template: NewTemplate) -> StorageResult<Template>;
    async fn delete_template(&self, id: RecordId) -> StorageResult<bool>;

    // --- logos ---

    async fn list_logos(&self, user_id: RecordId) -> StorageResult<Vec<Logo>>;
    async fn active_logo(&self, user_id: RecordId) -> StorageResult<Option<Logo>>;
    async fn create_logo(&self, logo: NewLogo) -> StorageResult<Logo>;
    /// Deactivate every logo of `user_id`, then activate `logo_id` if it
    /// belongs to that user. Returns whether a logo was activated.
    async fn set_active_logo(&self, user_id: RecordId, logo_id: RecordId) -> StorageResult<bool>;
    async fn delete_logo(&self, id: RecordId) -> StorageResult<bool>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// One record kind: rows keyed by id plus the next id to hand out.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<RecordId, T>,
    next_id: RecordId,
}

impl<T: Clone> Table<T> {
    fn next_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn get(&self, id: RecordId) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn filtered(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| keep(row)).cloned().collect()
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), next_id: 1 }
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    campaigns: Table<Campaign>,
    products: Table<Product>,
    campaign_products: Table<CampaignProduct>,
    templates: Table<Template>,
    logos: Table<Logo>,
}

/// In-memory [`Storage`].
#[derive(Debug, Default)]
pub struct MemStorage {
    tables: RwLock<Tables>,
}

impl MemStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn require_name(name: &str, kind: &str) -> StorageResult<()> {
    if name.trim().is_empty() {
        return Err(StorageError::Invalid(format!("{kind} name is empty")));
    }
    Ok(())
}

#[async_trait::async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: RecordId) -> StorageResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|user| user.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|existing| existing.username == user.username) {
            return Err(StorageError::Invalid(format!("username taken: {}", user.username)));
        }
        let id = tables.users.next_id();
        let user = User { id, username: user.username, password: user.password, name: user.name };
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn list_campaigns(&self, user_id: RecordId) -> StorageResult<Vec<Campaign>> {
        Ok(self.tables.read().await.campaigns.filtered(|c| c.user_id == user_id))
    }

    async fn get_campaign(&self, id: RecordId) -> StorageResult<Option<Campaign>> {
        Ok(self.tables.read().await.campaigns.get(id))
    }

    async fn create_campaign(&self, campaign: NewCampaign) -> StorageResult<Campaign> {
        require_name(&campaign.name, "campaign")?;
        let mut tables = self.tables.write().await;
        let id = tables.campaigns.next_id();
        let campaign = Campaign {
            id,
            name: campaign.name,
            description: campaign.description,
            status: campaign.status.unwrap_or_default(),
            user_id: campaign.user_id,
            template_id: campaign.template_id,
            logo_id: campaign.logo_id,
            company_name: campaign.company_name,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            valid_until: campaign.valid_until,
            created_at: Some(OffsetDateTime::now_utc()),
        };
        tables.campaigns.rows.insert(id, campaign.clone());
        debug!(campaign_id = id, "campaign created");
        Ok(campaign)
    }

    async fn update_campaign(&self, id: RecordId, patch: CampaignPatch) -> StorageResult<Campaign> {
        let mut tables = self.tables.write().await;
        let campaign = tables.campaigns.rows.get_mut(&id).ok_or(StorageError::NotFound { kind: "campaign", id })?;
        if let Some(name) = patch.name {
            campaign.name = name;
        }
        if let Some(description) = patch.description {
            campaign.description = Some(description);
        }
        if let Some(status) = patch.status {
            campaign.status = status;
        }
        if let Some(template_id) = patch.template_id {
            campaign.template_id = Some(template_id);
        }
        if let Some(logo_id) = patch.logo_id {
            campaign.logo_id = Some(logo_id);
        }
        if let Some(company_name) = patch.company_name {
            campaign.company_name = Some(company_name);
        }
        if let Some(valid_until) = patch.valid_until {
            campaign.valid_until = Some(valid_until);
        }
        Ok(campaign.clone())
    }

    async fn delete_campaign(&self, id: RecordId) -> StorageResult<bool> {
        Ok(self.tables.write().await.campaigns.rows.remove(&id).is_some())
    }

    async fn list_products(&self, search: Option<&str>, category: Option<&str>) -> StorageResult<Vec<Product>> {
        let needle = search.filter(|s| !s.is_empty()).map(str::to_lowercase);
        let category = category.filter(|c| !c.is_empty() && *c != "all");
        let tables = self.tables.read().await;
        Ok(tables.products.filtered(|product| {
            let matches_search = needle.as_deref().is_none_or(|needle| {
                contains_ci(&product.name, needle)
                    || product.description.as_deref().is_some_and(|d| contains_ci(d, needle))
            });
            let matches_category = category.is_none_or(|c| product.category == c);
            matches_search && matches_category
        }))
    }

    async fn get_product(&self, id: RecordId) -> StorageResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(id))
    }

    async fn create_product(&self, product: NewProduct) -> StorageResult<Product> {
        require_name(&product.name, "product")?;
        let mut tables = self.tables.write().await;
        let id = tables.products.next_id();
        let product = Product {
            id,
            name: product.name,
            category: product.category,
            original_price: product.original_price,
            image_url: product.image_url,
            description: product.description,
        };
        tables.products.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: RecordId, patch: ProductPatch) -> StorageResult<Product> {
        let mut tables = self.tables.write().await;
        let product = tables.products.rows.get_mut(&id).ok_or(StorageError::NotFound { kind: "product", id })?;
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(price) = patch.original_price {
            product.original_price = price;
        }
        if let Some(url) = patch.image_url {
            product.image_url = Some(url);
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        Ok(product.clone())
    }

    async fn delete_product(&self, id: RecordId) -> StorageResult<bool> {
        Ok(self.tables.write().await.products.rows.remove(&id).is_some())
    }

    async fn list_campaign_products(&self, campaign_id: RecordId) -> StorageResult<Vec<CampaignProduct>> {
        Ok(self.tables.read().await.campaign_products.filtered(|cp| cp.campaign_id == campaign_id))
    }

    async fn create_campaign_product(&self, placed: NewCampaignProduct) -> StorageResult<CampaignProduct> {
        let mut tables = self.tables.write().await;
        let id = tables.campaign_products.next_id();
        let placed = CampaignProduct {
            id,
            campaign_id: placed.campaign_id,
            product_id: placed.product_id,
            quantity: placed.quantity.unwrap_or(1),
            discount_percent: placed.discount_percent.unwrap_or(0.0),
            new_price: placed.new_price,
            position_x: placed.position_x.unwrap_or(0.0),
            position_y: placed.position_y.unwrap_or(0.0),
            scale_x: placed.scale_x.unwrap_or(1.0),
            scale_y: placed.scale_y.unwrap_or(1.0),
            rotation: placed.rotation.unwrap_or(0.0),
            page_number: placed.page_number.unwrap_or(1).max(1),
        };
        tables.campaign_products.rows.insert(id, placed.clone());
        Ok(placed)
    }

    async fn update_campaign_product(
        &self,
        id: RecordId,
        patch: CampaignProductPatch,
    ) -> StorageResult<CampaignProduct> {
        let mut tables = self.tables.write().await;
        let placed = tables
            .campaign_products
            .rows
            .get_mut(&id)
            .ok_or(StorageError::NotFound { kind: "campaign product", id })?;
        if let Some(quantity) = patch.quantity {
            placed.quantity = quantity;
        }
        if let Some(discount) = patch.discount_percent {
            placed.discount_percent = discount;
        }
        if let Some(price) = patch.new_price {
            placed.new_price = price;
        }
        if let Some(x) = patch.position_x {
            placed.position_x = x;
        }
        if let Some(y) = patch.position_y {
            placed.position_y = y;
        }
        if let Some(scale_x) = patch.scale_x {
            placed.scale_x = scale_x;
        }
        if let Some(scale_y) = patch.scale_y {
            placed.scale_y = scale_y;
        }
        if let Some(rotation) = patch.rotation {
            placed.rotation = rotation;
        }
        if let Some(page) = patch.page_number {
            placed.page_number = page.max(1);
        }
        Ok(placed.clone())
    }

    async fn delete_campaign_product(&self, id: RecordId) -> StorageResult<bool> {
        Ok(self.tables.write().await.campaign_products.rows.remove(&id).is_some())
    }

    async fn list_templates(&self, user_id: RecordId) -> StorageResult<Vec<Template>> {
        Ok(self.tables.read().await.templates.filtered(|t| t.user_id == user_id))
    }

    async fn get_template(&self, id: RecordId) -> StorageResult<Option<Template>> {
        Ok(self.tables.read().await.templates.get(id))
    }

    async fn create_template(&self, template: NewTemplate) -> StorageResult<Template> {
        require_name(&template.name, "template")?;
        let mut tables = self.tables.write().await;
        let id = tables.templates.next_id();
        let template = Template {
            id,
            name: template.name,
            description: template.description,
            file_path: template.file_path,
            thumbnail_path: template.thumbnail_path,
            user_id: template.user_id,
            created_at: Some(OffsetDateTime::now_utc()),
        };
        tables.templates.rows.insert(id, template.clone());
        Ok(template)
    }

    async fn delete_template(&self, id: RecordId) -> StorageResult<bool> {
        Ok(self.tables.write().await.templates.rows.remove(&id).is_some())
    }

    async fn list_logos(&self, user_id: RecordId) -> StorageResult<Vec<Logo>> {
        Ok(self.tables.read().await.logos.filtered(|l| l.user_id == user_id))
    }

    async fn active_logo(&self, user_id: RecordId) -> StorageResult<Option<Logo>> {
        let tables = self.tables.read().await;
        Ok(tables.logos.rows.values().find(|l| l.user_id == user_id && l.is_active).cloned())
    }

    async fn create_logo(&self, logo: NewLogo) -> StorageResult<Logo> {
        let mut tables = self.tables.write().await;
        let id = tables.logos.next_id();
        let logo = Logo {
            id,
            name: logo.name,
            file_path: logo.file_path,
            is_active: logo.is_active,
            user_id: logo.user_id,
            created_at: Some(OffsetDateTime::now_utc()),
        };
        tables.logos.rows.insert(id, logo.clone());
        Ok(logo)
    }

    async fn set_active_logo(&self, user_id: RecordId, logo_id: RecordId) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        for logo in tables.logos.rows.values_mut().filter(|l| l.user_id == user_id) {
            logo.is_active = false;
        }
        match tables.logos.rows.get_mut(&logo_id) {
            Some(logo) if logo.user_id == user_id => {
                logo.is_active = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_logo(&self, id: RecordId) -> StorageResult<bool> {
        Ok(self.tables.write().await.logos.rows.remove(&id).is_some())
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
