//! CityPulse live-query payloads, change bus and notification delivery.
//!
//! - [`Snapshot`]: one live-query delivery: full document set plus delta.
//! - [`ChangeBus`]: in-process fan-out of committed store writes, backed
//!   by `tokio::sync::broadcast`.
//! - [`delivery`]: system notifications (permission + notifier trait, log
//!   and webhook notifiers).

pub mod bus;
pub mod delivery;
pub mod snapshot;

pub use bus::{ChangeBus, CollectionChange};
pub use delivery::log::LogNotifier;
pub use delivery::webhook::WebhookNotifier;
pub use delivery::{NotificationPermission, NotifyError, SystemNotifier};
pub use snapshot::{ChangeKind, Document, DocumentChange, Snapshot};
