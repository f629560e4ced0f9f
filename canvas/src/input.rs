//! Input model: pointer targets, selection, drop zones, and the gesture state
//! machine.
//!
//! `Target` names what the pointer went down on. `InteractionSession` is the
//! active gesture being tracked between pointer-down and pointer-up, carrying
//! the start references needed to compute live updates and to finalize on
//! release. Only one session exists at a time, so two manipulations can never
//! run concurrently.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::geom::Point;
use crate::store::{ElementKind, ItemId, PageNumber, Scale};

/// What the pointer was pressed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Target {
    /// Body of the logo or company-name label.
    Element { kind: ElementKind },
    /// Body of a product.
    Product { id: ItemId },
    /// Rotate handle of a product.
    ProductRotate { id: ItemId },
    /// Resize handle of a product.
    ProductResize { id: ItemId },
    /// Date label of a page.
    DateLabel { page: PageNumber },
    /// Rotate handle of the logo.
    LogoRotate,
    /// Resize handle of the logo.
    LogoResize,
}

/// Which single thing has its transform controls showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    Product { id: ItemId },
    Logo,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub selection: Selection,
    /// Page whose drop zone is currently highlighted, if any.
    pub drop_target: Option<PageNumber>,
    /// Whether editing-only elements (handles, date drag chrome) are drawn.
    /// Cleared while a page is being exported.
    pub edit_controls_visible: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { selection: Selection::None, drop_target: None, edit_controls_visible: true }
    }
}

/// Drop-zone highlight state of one page during a cross-page drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DropZone {
    #[default]
    Idle,
    DragOver,
}

/// The active gesture.
///
/// Each active variant carries the context needed to compute live updates
/// and to finalize on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionSession {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving the logo or the company-name label.
    DraggingElement { kind: ElementKind },
    /// The user is moving a product within its page.
    DraggingProduct {
        id: ItemId,
        /// Grid cell the product occupied when the drag began.
        origin_cell: Option<usize>,
    },
    /// The user is rotating a product around its center.
    RotatingProduct {
        id: ItemId,
        /// Pointer angle at the previous event, in degrees.
        last_angle: f64,
    },
    /// The user is scaling a product by dragging its resize handle.
    ResizingProduct { id: ItemId, start_scale: Scale, start_pointer: Point },
    /// The user is moving a page's date label.
    DraggingDate {
        page: PageNumber,
        /// Pointer offset from the label's top-left corner at grab time.
        grab_offset: Point,
    },
    /// The user is rotating the logo.
    RotatingLogo { last_angle: f64 },
    /// The user is scaling the logo.
    ResizingLogo { start_scale: f64, start_pointer: Point },
}

impl InteractionSession {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
