//! Hit-testing: which target sits under a canvas-local point on a page.
//!
//! Hosts that already know what was pressed (a DOM handle, for example) pass
//! a [`Target`] straight to the engine; hosts that only have coordinates use
//! [`hit_test`].

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{
    DATE_LABEL_HEIGHT, DATE_LABEL_WIDTH, ELEMENT_FOOTPRINT, HANDLE_RADIUS_PX, LOGO_BASE_SIZE, PRODUCT_FOOTPRINT,
};
use crate::geom::Point;
use crate::input::{Selection, Target};
use crate::store::{ElementKind, PageNumber, PlacementStore};

/// Axis-aligned rectangle in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// A `size`-square scaled by `factor` about its own center.
    #[must_use]
    pub fn scaled_square(top_left: Point, size: f64, factor: f64) -> Self {
        let half = size / 2.0;
        let center = top_left.offset(half, half);
        let scaled_half = half * factor.abs();
        Self {
            x: center.x - scaled_half,
            y: center.y - scaled_half,
            width: scaled_half * 2.0,
            height: scaled_half * 2.0,
        }
    }

    fn top_right(&self) -> Point {
        Point::new(self.x + self.width, self.y)
    }

    fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }
}

fn near(handle: Point, p: Point) -> bool {
    handle.distance_sq(p) <= HANDLE_RADIUS_PX * HANDLE_RADIUS_PX
}

/// Test which target (if any) is under `point` on `page`, checking the
/// selected product's or logo's handles first.
#[must_use]
pub fn hit_test(point: Point, store: &PlacementStore, page: PageNumber, selection: Selection) -> Option<Target> {
    match selection {
        Selection::Product { id } => {
            if let Some(item) = store.get(id).filter(|item| item.page == page) {
                let bounds = Rect::scaled_square(item.position, PRODUCT_FOOTPRINT, item.scale.scale_x);
                if near(bounds.top_right(), point) {
                    return Some(Target::ProductRotate { id });
                }
                if near(bounds.bottom_right(), point) {
                    return Some(Target::ProductResize { id });
                }
            }
        }
        Selection::Logo => {
            let logo = store.logo();
            let bounds = Rect::scaled_square(logo.position, LOGO_BASE_SIZE, logo.scale);
            if near(bounds.top_right(), point) {
                return Some(Target::LogoRotate);
            }
            if near(bounds.bottom_right(), point) {
                return Some(Target::LogoResize);
            }
        }
        Selection::None => {}
    }

    let date = store.date_position(page);
    let date_rect = Rect { x: date.x, y: date.y, width: DATE_LABEL_WIDTH, height: DATE_LABEL_HEIGHT };
    if date_rect.contains(point) {
        return Some(Target::DateLabel { page });
    }

    // Later items are drawn on top, so test them first.
    let on_page = store.items_on_page(page);
    for item in on_page.iter().rev() {
        let bounds = Rect::scaled_square(item.position, PRODUCT_FOOTPRINT, item.scale.scale_x);
        if bounds.contains(point) {
            return Some(Target::Product { id: item.id });
        }
    }

    let logo = store.logo();
    if Rect::scaled_square(logo.position, LOGO_BASE_SIZE, logo.scale).contains(point) {
        return Some(Target::Element { kind: ElementKind::Logo });
    }

    let name = store.element_position(ElementKind::CompanyName);
    let name_rect = Rect { x: name.x, y: name.y, width: ELEMENT_FOOTPRINT * 4.0, height: ELEMENT_FOOTPRINT };
    if name_rect.contains(point) {
        return Some(Target::Element { kind: ElementKind::CompanyName });
    }

    None
}
