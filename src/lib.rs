//! Editor session for the brochure designer.
//!
//! Wraps the layout engine from `brochure_canvas` with everything around it:
//! configuration, the wire records exchanged with the record store, campaign
//! save and load, flushing committed product positions, page export, and
//! the notifications shown to the user when any of that fails.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Environment-driven editor configuration |
//! | [`error`] | Error codes and user-facing notifications |
//! | [`records`] | Wire records for users, campaigns, products, templates and logos |
//! | [`services::storage`] | Record store interface and in-memory implementation |
//! | [`services::campaign`] | Campaign save/load and date-range labels |
//! | [`services::persistence`] | Dirty position tracking and flushing |
//! | [`services::export`] | Page export with edit-control suppression |
//! | [`session`] | The editing session tying engine and services together |

pub mod config;
pub mod error;
pub mod records;
pub mod services;
pub mod session;
