#![allow(clippy::float_cmp)]

use super::*;
use crate::records::CampaignStatus;

fn product(name: &str, category: &str, description: Option<&str>) -> NewProduct {
    NewProduct {
        name: name.into(),
        category: category.into(),
        original_price: 10.0,
        image_url: None,
        description: description.map(Into::into),
    }
}

fn logo(user_id: RecordId, name: &str) -> NewLogo {
    NewLogo { name: name.into(), file_path: format!("{name}.png"), is_active: false, user_id }
}

// =============================================================================
// StorageError
// =============================================================================

#[test]
fn error_codes_and_retryable() {
    let not_found = StorageError::NotFound { kind: "campaign", id: 4 };
    assert_eq!(not_found.error_code(), "E_NOT_FOUND");
    assert_eq!(not_found.to_string(), "campaign not found: 4");
    assert!(!not_found.retryable());
    assert!(StorageError::Unavailable("down".into()).retryable());
    assert_eq!(StorageError::Invalid("x".into()).error_code(), "E_INVALID_RECORD");
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn users_get_by_id_and_username() {
    let store = MemStorage::new();
    let user = store
        .create_user(NewUser { username: "ana".into(), password: "pw".into(), name: "Ana".into() })
        .await
        .unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(store.get_user(1).await.unwrap(), Some(user.clone()));
    assert_eq!(store.get_user_by_username("ana").await.unwrap(), Some(user));
    assert_eq!(store.get_user_by_username("bob").await.unwrap(), None);
}

#[tokio::test]
async fn duplicate_username_rejected() {
    let store = MemStorage::new();
    let new = NewUser { username: "ana".into(), password: "pw".into(), name: "Ana".into() };
    store.create_user(new.clone()).await.unwrap();
    assert!(matches!(store.create_user(new).await, Err(StorageError::Invalid(_))));
}

// =============================================================================
// Campaigns
// =============================================================================

#[tokio::test]
async fn campaign_defaults_to_draft_with_timestamp() {
    let store = MemStorage::new();
    let campaign = store
        .create_campaign(NewCampaign { name: "Weekly".into(), user_id: 1, ..NewCampaign::default() })
        .await
        .unwrap();
    assert_eq!(campaign.status, CampaignStatus::Draft);
    assert!(campaign.created_at.is_some());
}

#[tokio::test]
async fn campaign_ids_increase_per_kind() {
    let store = MemStorage::new();
    let a = store.create_campaign(NewCampaign { name: "A".into(), user_id: 1, ..NewCampaign::default() }).await.unwrap();
    store.create_product(product("Milk", "Dairy", None)).await.unwrap();
    let b = store.create_campaign(NewCampaign { name: "B".into(), user_id: 1, ..NewCampaign::default() }).await.unwrap();
    assert_eq!((a.id, b.id), (1, 2));
}

#[tokio::test]
async fn campaign_empty_name_is_invalid() {
    let store = MemStorage::new();
    let result = store.create_campaign(NewCampaign { name: "  ".into(), user_id: 1, ..NewCampaign::default() }).await;
    assert!(matches!(result, Err(StorageError::Invalid(_))));
}

#[tokio::test]
async fn campaigns_listed_per_user() {
    let store = MemStorage::new();
    store.create_campaign(NewCampaign { name: "A".into(), user_id: 1, ..NewCampaign::default() }).await.unwrap();
    store.create_campaign(NewCampaign { name: "B".into(), user_id: 2, ..NewCampaign::default() }).await.unwrap();
    let listed = store.list_campaigns(2).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "B");
}

#[tokio::test]
async fn campaign_update_is_partial() {
    let store = MemStorage::new();
    let created = store
        .create_campaign(NewCampaign {
            name: "A".into(),
            user_id: 1,
            company_name: Some("Shop".into()),
            ..NewCampaign::default()
        })
        .await
        .unwrap();
    let patch = CampaignPatch { status: Some(CampaignStatus::Active), ..CampaignPatch::default() };
    let updated = store.update_campaign(created.id, patch).await.unwrap();
    assert_eq!(updated.status, CampaignStatus::Active);
    assert_eq!(updated.name, "A");
    assert_eq!(updated.company_name.as_deref(), Some("Shop"));
}

#[tokio::test]
async fn campaign_update_missing_is_not_found() {
    let store = MemStorage::new();
    let err = store.update_campaign(9, CampaignPatch::default()).await.unwrap_err();
    assert_eq!(err, StorageError::NotFound { kind: "campaign", id: 9 });
}

#[tokio::test]
async fn campaign_delete_reports_removal() {
    let store = MemStorage::new();
    let c = store.create_campaign(NewCampaign { name: "A".into(), user_id: 1, ..NewCampaign::default() }).await.unwrap();
    assert!(store.delete_campaign(c.id).await.unwrap());
    assert!(!store.delete_campaign(c.id).await.unwrap());
    assert_eq!(store.get_campaign(c.id).await.unwrap(), None);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn product_search_is_case_insensitive_on_name_and_description() {
    let store = MemStorage::new();
    store.create_product(product("Whole Milk", "Dairy", None)).await.unwrap();
    store.create_product(product("Bread", "Bakery", Some("Fresh sourdough, no MILK"))).await.unwrap();
    store.create_product(product("Apples", "Produce", None)).await.unwrap();

    let found = store.list_products(Some("milk"), None).await.unwrap();
    let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Whole Milk", "Bread"]);
}

#[tokio::test]
async fn product_category_all_matches_everything() {
    let store = MemStorage::new();
    store.create_product(product("Milk", "Dairy", None)).await.unwrap();
    store.create_product(product("Bread", "Bakery", None)).await.unwrap();
    assert_eq!(store.list_products(None, Some("all")).await.unwrap().len(), 2);
    assert_eq!(store.list_products(None, Some("Bakery")).await.unwrap().len(), 1);
    assert_eq!(store.list_products(Some(""), Some("Dairy")).await.unwrap()[0].name, "Milk");
}

#[tokio::test]
async fn product_update_and_delete() {
    let store = MemStorage::new();
    let p = store.create_product(product("Milk", "Dairy", None)).await.unwrap();
    let updated = store
        .update_product(p.id, ProductPatch { original_price: Some(2.5), ..ProductPatch::default() })
        .await
        .unwrap();
    assert_eq!(updated.original_price, 2.5);
    assert_eq!(updated.name, "Milk");
    assert!(store.delete_product(p.id).await.unwrap());
    assert!(store.update_product(p.id, ProductPatch::default()).await.is_err());
}

// =============================================================================
// Campaign products
// =============================================================================

#[tokio::test]
async fn campaign_product_defaults() {
    let store = MemStorage::new();
    let placed = store
        .create_campaign_product(NewCampaignProduct {
            campaign_id: 1,
            product_id: 5,
            new_price: 9.0,
            ..NewCampaignProduct::default()
        })
        .await
        .unwrap();
    assert_eq!(placed.quantity, 1);
    assert_eq!(placed.discount_percent, 0.0);
    assert_eq!((placed.position_x, placed.position_y), (0.0, 0.0));
    assert_eq!((placed.scale_x, placed.scale_y), (1.0, 1.0));
    assert_eq!(placed.page_number, 1);
}

#[tokio::test]
async fn campaign_product_position_update() {
    let store = MemStorage::new();
    let placed = store
        .create_campaign_product(NewCampaignProduct {
            campaign_id: 1,
            product_id: 5,
            rotation: Some(15.0),
            ..NewCampaignProduct::default()
        })
        .await
        .unwrap();
    let moved = store.update_campaign_product_position(placed.id, 54.0, 194.0).await.unwrap();
    assert_eq!((moved.position_x, moved.position_y), (54.0, 194.0));
    assert_eq!(moved.rotation, 15.0);
    assert_eq!(store.list_campaign_products(1).await.unwrap(), vec![moved]);
}

#[tokio::test]
async fn campaign_product_position_update_missing() {
    let store = MemStorage::new();
    let err = store.update_campaign_product_position(3, 1.0, 1.0).await.unwrap_err();
    assert_eq!(err.error_code(), "E_NOT_FOUND");
}

#[tokio::test]
async fn campaign_products_listed_per_campaign() {
    let store = MemStorage::new();
    for campaign_id in [1, 2, 1] {
        store
            .create_campaign_product(NewCampaignProduct { campaign_id, product_id: 1, ..NewCampaignProduct::default() })
            .await
            .unwrap();
    }
    assert_eq!(store.list_campaign_products(1).await.unwrap().len(), 2);
    assert!(store.delete_campaign_product(2).await.unwrap());
    assert!(store.list_campaign_products(2).await.unwrap().is_empty());
}

// =============================================================================
// Templates
// =============================================================================

#[tokio::test]
async fn templates_crud() {
    let store = MemStorage::new();
    let t = store
        .create_template(NewTemplate { name: "Spring".into(), file_path: "s.jpg".into(), user_id: 1, ..NewTemplate::default() })
        .await
        .unwrap();
    assert_eq!(store.list_templates(1).await.unwrap().len(), 1);
    assert!(store.list_templates(2).await.unwrap().is_empty());
    assert_eq!(store.get_template(t.id).await.unwrap().map(|t| t.background_url()), Some("/uploads/s.jpg".into()));
    assert!(store.delete_template(t.id).await.unwrap());
}

// =============================================================================
// Logos
// =============================================================================

#[tokio::test]
async fn set_active_logo_deactivates_others() {
    let store = MemStorage::new();
    let a = store.create_logo(NewLogo { is_active: true, ..logo(1, "a") }).await.unwrap();
    let b = store.create_logo(logo(1, "b")).await.unwrap();

    assert!(store.set_active_logo(1, b.id).await.unwrap());
    let active = store.active_logo(1).await.unwrap().unwrap();
    assert_eq!(active.id, b.id);
    let logos = store.list_logos(1).await.unwrap();
    assert!(!logos.iter().find(|l| l.id == a.id).unwrap().is_active);
}

#[tokio::test]
async fn set_active_logo_of_other_user_fails_but_still_deactivates() {
    let store = MemStorage::new();
    store.create_logo(NewLogo { is_active: true, ..logo(1, "mine") }).await.unwrap();
    let theirs = store.create_logo(logo(2, "theirs")).await.unwrap();

    assert!(!store.set_active_logo(1, theirs.id).await.unwrap());
    assert_eq!(store.active_logo(1).await.unwrap(), None);
    assert!(!store.list_logos(2).await.unwrap()[0].is_active);
}

#[tokio::test]
async fn delete_logo() {
    let store = MemStorage::new();
    let l = store.create_logo(logo(1, "a")).await.unwrap();
    assert!(store.delete_logo(l.id).await.unwrap());
    assert!(!store.delete_logo(l.id).await.unwrap());
}
