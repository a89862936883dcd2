//! Live collection sync.
//!
//! A [`LiveSync`] owns one live query per mirrored collection and turns
//! store snapshots into [`SyncEvent`]s for the owning view:
//!
//! - `projects` and `reports`: every snapshot replaces the whole mirror.
//! - `alerts`: only documents marked added in the snapshot delta are
//!   forwarded; modified and removed alerts are ignored. Each added alert
//!   also raises a best-effort system notification.
//!
//! Subscription errors and malformed documents are logged and skipped, so a
//! mirror keeps its last good state. Dropping the `LiveSync` releases every
//! subscription.

use std::sync::Arc;

use citypulse_core::alert::{Alert, COLLECTION_ALERTS};
use citypulse_core::error::CoreError;
use citypulse_core::project::{Project, COLLECTION_PROJECTS};
use citypulse_core::report::{Report, COLLECTION_REPORTS};
use citypulse_events::{Document, NotificationPermission, Snapshot, SystemNotifier};
use citypulse_store::{DocumentStore, StoreError, Subscription};

/// One mirror update for the owning view.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// Full replacement of the projects mirror.
    Projects(Vec<Project>),
    /// Full replacement of the reports mirror.
    Reports(Vec<Report>),
    /// Alerts to append, in delta order.
    AlertsAdded(Vec<Alert>),
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Projects,
    Reports,
    Alerts,
}

impl Slot {
    fn collection(self) -> &'static str {
        match self {
            Self::Projects => COLLECTION_PROJECTS,
            Self::Reports => COLLECTION_REPORTS,
            Self::Alerts => COLLECTION_ALERTS,
        }
    }
}

pub struct LiveSync {
    projects: Option<Subscription>,
    reports: Option<Subscription>,
    alerts: Option<Subscription>,
    notifier: Option<Arc<dyn SystemNotifier>>,
}

impl LiveSync {
    /// Projects, reports and alerts, with system notifications for alerts.
    ///
    /// Requests notification permission once if it is still undecided.
    pub async fn citizen(store: &dyn DocumentStore, notifier: Arc<dyn SystemNotifier>) -> Self {
        if notifier.permission() == NotificationPermission::Default {
            let permission = notifier.request_permission().await;
            tracing::debug!(?permission, "Notification permission requested");
        }
        Self {
            projects: open(store, Slot::Projects).await,
            reports: open(store, Slot::Reports).await,
            alerts: open(store, Slot::Alerts).await,
            notifier: Some(notifier),
        }
    }

    /// Projects and reports only.
    pub async fn officials(store: &dyn DocumentStore) -> Self {
        Self {
            projects: open(store, Slot::Projects).await,
            reports: open(store, Slot::Reports).await,
            alerts: None,
            notifier: None,
        }
    }

    /// Collections with an open live query.
    pub fn collections(&self) -> Vec<&str> {
        [&self.projects, &self.reports, &self.alerts]
            .into_iter()
            .flatten()
            .map(Subscription::collection)
            .collect()
    }

    /// Wait for the next mirror update.
    ///
    /// Returns `None` once every live query has ended. Cancel-safe: dropping
    /// the future loses no delivery that was not already returned.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        loop {
            let (slot, item) = tokio::select! {
                item = next_of(&mut self.projects), if self.projects.is_some() => (Slot::Projects, item),
                item = next_of(&mut self.reports), if self.reports.is_some() => (Slot::Reports, item),
                item = next_of(&mut self.alerts), if self.alerts.is_some() => (Slot::Alerts, item),
                else => return None,
            };

            match item {
                None => {
                    tracing::info!(collection = slot.collection(), "Live query ended");
                    *self.slot_mut(slot) = None;
                }
                Some(Err(e)) => {
                    tracing::error!(
                        collection = slot.collection(),
                        error = %e,
                        "Live query error, keeping last mirror"
                    );
                }
                Some(Ok(snapshot)) => return Some(self.decode(slot, snapshot)),
            }
        }
    }

    /// Release every live query now.
    pub fn release(mut self) {
        for sub in [
            self.projects.take(),
            self.reports.take(),
            self.alerts.take(),
        ]
        .into_iter()
        .flatten()
        {
            sub.release();
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Subscription> {
        match slot {
            Slot::Projects => &mut self.projects,
            Slot::Reports => &mut self.reports,
            Slot::Alerts => &mut self.alerts,
        }
    }

    fn decode(&self, slot: Slot, snapshot: Snapshot) -> SyncEvent {
        match slot {
            Slot::Projects => {
                SyncEvent::Projects(decode_all(&snapshot.docs, Project::from_document))
            }
            Slot::Reports => SyncEvent::Reports(decode_all(&snapshot.docs, Report::from_document)),
            Slot::Alerts => {
                let added: Vec<Alert> = snapshot
                    .added()
                    .filter_map(|doc| decode_one(doc, Alert::from_document))
                    .collect();
                for alert in &added {
                    self.notify(alert);
                }
                SyncEvent::AlertsAdded(added)
            }
        }
    }

    /// Fire-and-forget; the view never waits on notification delivery.
    fn notify(&self, alert: &Alert) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if notifier.permission() != NotificationPermission::Granted {
            return;
        }
        let notifier = Arc::clone(notifier);
        let title = alert.notification_title();
        let body = alert.message.clone();
        let alert_id = alert.id.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&title, &body).await {
                tracing::debug!(%alert_id, error = %e, "System notification failed");
            }
        });
    }
}

async fn open(store: &dyn DocumentStore, slot: Slot) -> Option<Subscription> {
    match store.listen(slot.collection()).await {
        Ok(sub) => Some(sub),
        Err(e) => {
            tracing::error!(collection = slot.collection(), error = %e, "Failed to open live query");
            None
        }
    }
}

async fn next_of(sub: &mut Option<Subscription>) -> Option<Result<Snapshot, StoreError>> {
    match sub {
        Some(sub) => sub.next_snapshot().await,
        None => std::future::pending().await,
    }
}

type Decoder<T> = fn(&str, serde_json::Value) -> Result<T, CoreError>;

fn decode_all<T>(docs: &[Document], decode: Decoder<T>) -> Vec<T> {
    docs.iter().filter_map(|doc| decode_one(doc, decode)).collect()
}

fn decode_one<T>(doc: &Document, decode: Decoder<T>) -> Option<T> {
    match decode(&doc.id, doc.data.clone()) {
        Ok(item) => Some(item),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed document");
            None
        }
    }
}
