//! Layout and manipulation engine for the brochure designer.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! placement state of every page: where each product sits, how it is rotated
//! and scaled, which page it belongs to, and where the free elements (logo,
//! company name, date labels) are. It translates pointer input into store
//! mutations, snaps and swaps products on the fixed 3×3 grid, and runs the
//! balanced auto-layout. The host layer wires DOM events to the engine and
//! persists the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`store`] | Placement store and item types |
//! | [`grid`] | Fixed grid and dynamic layout geometry |
//! | [`geom`] | Points, canvas sizes, angles and clamping |
//! | [`input`] | Pointer targets, selection and the gesture state machine |
//! | [`hit`] | Hit-testing against products, handles and free elements |
//! | [`layout`] | Auto-layout planner |
//! | [`pages`] | Page add/remove, cross-page moves and distribution |
//! | [`projection`] | Read-only view for the renderer |
//! | [`debounce`] | Host-clocked debouncer for auto-layout |
//! | [`consts`] | Shared numeric constants (bands, footprints, floors, delays) |

pub mod consts;
pub mod debounce;
pub mod engine;
pub mod geom;
pub mod grid;
pub mod hit;
pub mod input;
pub mod layout;
pub mod pages;
pub mod projection;
pub mod store;
