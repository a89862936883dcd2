//! CityPulse client controllers.
//!
//! Each view is a single-writer event loop: it owns its mirrors, selection
//! and form, and only suspends on calls into the store, the auth service or
//! a live query.
//!
//! - [`session::SessionGate`]: sign-in against the privileged allow-list and
//!   the citizen/officials view switch.
//! - [`sync::LiveSync`]: live queries turned into mirror updates.
//! - [`submit::ReportSubmitter`]: single-flight report submission.
//! - [`citizen::CitizenMap`] and [`dashboard::OfficialsDashboard`]: the two
//!   views, each producing a serializable view model.

pub mod citizen;
pub mod dashboard;
pub mod error;
pub mod session;
pub mod submit;
pub mod sync;
pub mod tray;
mod view;

pub use citizen::{CitizenMap, CitizenViewModel};
pub use dashboard::{DashboardViewModel, OfficialsDashboard};
pub use error::{GateError, SubmitError};
pub use session::SessionGate;
pub use submit::{PendingSubmit, ReportSubmitter};
pub use sync::{LiveSync, SyncEvent};
pub use tray::NoticeTray;
