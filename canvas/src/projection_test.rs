use super::*;
use crate::store::CanvasItem;

fn store_with(items: &[(ItemId, PageNumber)]) -> PlacementStore {
    let mut store = PlacementStore::new();
    store.set_page_count(items.iter().map(|(_, p)| *p).max().unwrap_or(1));
    for (id, page) in items {
        store.insert(CanvasItem {
            id: *id,
            position: Point::new(50.0, 60.0),
            rotation: 15.0,
            scale: Scale::uniform(1.5),
            page: *page,
            grid_index: None,
        });
    }
    store
}

fn canvas() -> CanvasSize {
    CanvasSize::clamped(600.0, 800.0)
}

#[test]
fn projects_every_page_in_order() {
    let store = store_with(&[(1, 1), (2, 3)]);
    let view = project(&store, &UiState::default(), canvas());
    let pages: Vec<PageNumber> = view.pages.iter().map(|p| p.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert!(view.pages[1].items.is_empty());
    assert_eq!(view.pages[2].items[0].id, 2);
}

#[test]
fn item_view_copies_transform() {
    let store = store_with(&[(1, 1)]);
    let page = project_page(&store, &UiState::default(), 1);
    let item = &page.items[0];
    assert_eq!(item.position, Point::new(50.0, 60.0));
    assert_eq!(item.scale, Scale::uniform(1.5));
    assert!(!item.show_controls);
}

#[test]
fn selected_product_shows_controls() {
    let store = store_with(&[(1, 1), (2, 1)]);
    let ui = UiState { selection: Selection::Product { id: 2 }, ..UiState::default() };
    let page = project_page(&store, &ui, 1);
    assert!(!page.items[0].show_controls);
    assert!(page.items[1].show_controls);
}

#[test]
fn hidden_edit_controls_suppress_handles() {
    let store = store_with(&[(1, 1)]);
    let ui = UiState { selection: Selection::Product { id: 1 }, edit_controls_visible: false, ..UiState::default() };
    let view = project(&store, &ui, canvas());
    assert!(!view.edit_controls_visible);
    assert!(!view.pages[0].items[0].show_controls);
}

#[test]
fn logo_controls_follow_selection() {
    let store = PlacementStore::new();
    let ui = UiState { selection: Selection::Logo, ..UiState::default() };
    assert!(project(&store, &ui, canvas()).logo_controls);
    assert!(!project(&store, &UiState::default(), canvas()).logo_controls);
}

#[test]
fn drop_target_marks_page() {
    let store = store_with(&[(1, 2)]);
    let ui = UiState { drop_target: Some(2), ..UiState::default() };
    let view = project(&store, &ui, canvas());
    assert_eq!(view.pages[0].drop_zone, DropZone::Idle);
    assert_eq!(view.pages[1].drop_zone, DropZone::DragOver);
}

#[test]
fn view_serializes_camel_case() {
    let store = store_with(&[(1, 1)]);
    let json = serde_json::to_value(project(&store, &UiState::default(), canvas())).unwrap();
    assert_eq!(json["editControlsVisible"], true);
    assert_eq!(json["pages"][0]["datePosition"]["x"], 320.0);
    assert_eq!(json["pages"][0]["items"][0]["showControls"], false);
    assert_eq!(json["pages"][0]["items"][0]["scale"]["scaleX"], 1.5);
}
