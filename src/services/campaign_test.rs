#![allow(clippy::float_cmp)]

use super::*;
use crate::services::storage::MemStorage;
use crate::services::storage::test_helpers::FlakyStorage;
use brochure_canvas::geom::Point;
use brochure_canvas::grid::compute_fixed_grid;
use time::macros::{date, datetime};

// =============================================================================
// Helpers
// =============================================================================

fn selected(product_id: RecordId) -> SelectedProduct {
    SelectedProduct { product_id, quantity: 2, discount_percent: 15.0, new_price: 8.5 }
}

fn draft(name: &str, products: &[RecordId]) -> CampaignDraft {
    CampaignDraft {
        user_id: 1,
        name: name.into(),
        company_name: Some("Corner Market".into()),
        start_date: Some(datetime!(2024-03-01 00:00 UTC)),
        products: products.iter().copied().map(selected).collect(),
        ..CampaignDraft::default()
    }
}

fn placements(ids: &[RecordId]) -> PlacementStore {
    let mut store = PlacementStore::new();
    let seeds: Vec<ItemSeed> = ids.iter().map(|&id| ItemSeed { id, ..ItemSeed::default() }).collect();
    store.seed(&seeds, &compute_fixed_grid(600.0, 800.0));
    store
}

fn template(id: RecordId, file_path: &str) -> Template {
    Template {
        id,
        name: format!("t{id}"),
        description: None,
        file_path: file_path.into(),
        thumbnail_path: None,
        user_id: 1,
        created_at: None,
    }
}

// =============================================================================
// Template choice
// =============================================================================

#[test]
fn campaign_template_prefers_first_set_page_template() {
    let mut d = draft("A", &[]);
    d.selected_template_id = Some(9);
    d.page_templates = BTreeMap::from([(1, None), (2, Some(4)), (3, Some(5))]);
    assert_eq!(d.campaign_template_id(), Some(4));
}

#[test]
fn campaign_template_falls_back_without_page_entries() {
    let mut d = draft("A", &[]);
    d.selected_template_id = Some(9);
    assert_eq!(d.campaign_template_id(), Some(9));
}

#[test]
fn campaign_template_none_when_all_pages_unset() {
    let mut d = draft("A", &[]);
    d.selected_template_id = Some(9);
    d.page_templates = BTreeMap::from([(1, None)]);
    assert_eq!(d.campaign_template_id(), None);
}

#[test]
fn background_uses_page_template_then_global() {
    let templates = [template(1, "global.jpg"), template(2, "page2.jpg")];
    let pages = BTreeMap::from([(2, Some(2)), (3, Some(99))]);
    assert_eq!(template_background_url(2, &pages, Some(1), &templates).as_deref(), Some("/uploads/page2.jpg"));
    // Unknown page template falls back to the global one.
    assert_eq!(template_background_url(3, &pages, Some(1), &templates).as_deref(), Some("/uploads/global.jpg"));
    assert_eq!(template_background_url(1, &pages, Some(1), &templates).as_deref(), Some("/uploads/global.jpg"));
    assert_eq!(template_background_url(1, &pages, None, &templates), None);
}

// =============================================================================
// Date range
// =============================================================================

#[test]
fn date_range_labels() {
    assert_eq!(format_date_range(None, None), "Select dates");
    assert_eq!(format_date_range(Some(date!(2024 - 03 - 01)), None), "From Mar 01, 2024");
    assert_eq!(format_date_range(None, Some(date!(2024 - 12 - 31))), "Until Dec 31, 2024");
    assert_eq!(
        format_date_range(Some(date!(2024 - 03 - 01)), Some(date!(2024 - 03 - 15))),
        "Mar 01 - Mar 15, 2024"
    );
}

// =============================================================================
// Save
// =============================================================================

#[tokio::test]
async fn blank_name_makes_no_storage_calls() {
    let storage = FlakyStorage::new(0, StorageError::Unavailable("x".into()));
    let err = save_campaign(&storage, &draft("   ", &[1]), &placements(&[1])).await.unwrap_err();
    assert!(matches!(err, CampaignError::NameRequired));
    assert_eq!(storage.attempts(), 0);
    let note = err.save_notification();
    assert_eq!(note.title, "Campaign name required");
    assert_eq!(note.description, "Please enter a name for your campaign.");
    assert!(note.is_destructive());
}

#[tokio::test]
async fn save_creates_active_campaign_and_placed_products() {
    let storage = MemStorage::new();
    let mut store = placements(&[11, 12]);
    store.set_position(12, Point::new(54.0, 194.0)).unwrap();
    store.set_rotation(12, 45.0).unwrap();
    store.set_scale(12, Scale::uniform(1.5)).unwrap();
    store.set_page_count(2);
    store.set_page(12, 2).unwrap();

    let saved = save_campaign(&storage, &draft("Weekly", &[11, 12]), &store).await.unwrap();

    assert_eq!(saved.campaign.status, CampaignStatus::Active);
    assert_eq!(saved.campaign.company_name.as_deref(), Some("Corner Market"));
    assert_eq!(saved.products.len(), 2);
    let p = saved.products.iter().find(|p| p.product_id == 12).unwrap();
    assert_eq!((p.position_x, p.position_y), (54.0, 194.0));
    assert_eq!(p.rotation, 45.0);
    assert_eq!((p.scale_x, p.scale_y), (1.5, 1.5));
    assert_eq!(p.page_number, 2);
    assert_eq!(p.quantity, 2);
    assert_eq!(p.discount_percent, 15.0);
    assert_eq!(p.new_price, 8.5);
    assert_eq!(saved.notification().title, "Campaign created successfully");
}

#[tokio::test]
async fn save_of_unplaced_product_uses_defaults() {
    let storage = MemStorage::new();
    let saved = save_campaign(&storage, &draft("Weekly", &[5]), &PlacementStore::new()).await.unwrap();
    let p = &saved.products[0];
    assert_eq!((p.position_x, p.position_y), (0.0, 0.0));
    assert_eq!((p.scale_x, p.scale_y, p.rotation, p.page_number), (1.0, 1.0, 0.0, 1));
}

#[tokio::test]
async fn save_failure_notifies() {
    let storage = FlakyStorage::new(1, StorageError::Unavailable("db down".into()));
    let err = save_campaign(&storage, &draft("Weekly", &[1]), &placements(&[1])).await.unwrap_err();
    assert!(err.retryable());
    let note = err.save_notification();
    assert_eq!(note.title, "Campaign creation failed");
    assert_eq!(note.code, Some("E_STORAGE_UNAVAILABLE"));
}

// =============================================================================
// Load
// =============================================================================

#[tokio::test]
async fn saved_campaign_loads_back_as_seeds() {
    let storage = MemStorage::new();
    let mut store = placements(&[11, 12]);
    store.set_page_count(3);
    store.set_page(11, 3).unwrap();
    let saved = save_campaign(&storage, &draft("Weekly", &[11, 12]), &store).await.unwrap();

    let loaded = load_campaign(&storage, saved.campaign.id).await.unwrap();
    assert_eq!(loaded.page_count(), 3);
    let seeds = loaded.seeds();
    assert_eq!(seeds.len(), 2);
    let seed = seeds.iter().find(|s| s.id == 11).unwrap();
    assert_eq!(seed.position, Some(store.position(11).unwrap()));
    assert_eq!(seed.page, Some(3));
    assert_eq!(loaded.record_ids().get(&12), Some(&saved.products[1].id));
}

#[tokio::test]
async fn load_missing_campaign() {
    let storage = MemStorage::new();
    let err = load_campaign(&storage, 42).await.unwrap_err();
    assert!(matches!(err, CampaignError::NotFound(42)));
    assert_eq!(err.load_notification().code, Some("E_CAMPAIGN_NOT_FOUND"));
}

#[test]
fn empty_campaign_has_one_page() {
    let loaded = LoadedCampaign {
        campaign: Campaign {
            id: 1,
            name: "A".into(),
            description: None,
            status: CampaignStatus::Draft,
            user_id: 1,
            template_id: None,
            logo_id: None,
            company_name: None,
            start_date: None,
            end_date: None,
            valid_until: None,
            created_at: None,
        },
        products: Vec::new(),
    };
    assert_eq!(loaded.page_count(), 1);
    assert!(loaded.seeds().is_empty());
}
