//! CityPulse domain model.
//!
//! Pure types and derivations shared by the client controllers and the
//! server: entities mirrored from the store, the privileged-account
//! allow-list, dashboard aggregation, filtering and presentation models.
//! Nothing in this crate performs I/O.

pub mod alert;
pub mod error;
pub mod filter;
pub mod presentation;
pub mod project;
pub mod report;
pub mod session;
pub mod stats;
pub mod types;
