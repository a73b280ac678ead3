//! Data core for the Nimbus CRM.
//!
//! The crate is split along the data flow:
//! - `remote`: wire contract for the external record-storage service,
//!   with an HTTP backend and a seedable in-memory backend
//! - `store`: per-entity record mappers and CRUD store clients
//! - `services`: pure aggregation over fetched collections (dashboard
//!   stats, recent feed, timeline grouping, pipeline buckets, filters)
//! - `forms`: field descriptors and local validation for entity forms
//!
//! The view layer (routing, rendering, modals) lives elsewhere; this
//! crate exposes everything a UI shell needs to drive it.

pub mod error;
pub mod forms;
pub mod remote;
pub mod services;
pub mod store;
pub mod types;
