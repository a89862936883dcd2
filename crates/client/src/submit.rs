//! Report submission with a single-flight guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use citypulse_core::error::CoreError;
use citypulse_core::report::{ReportDraft, COLLECTION_REPORTS};
use citypulse_core::types::{DocId, Position};
use citypulse_store::DocumentStore;

use crate::error::SubmitError;

/// Writes drafts to the `reports` collection, one at a time.
///
/// Clones share the in-flight flag, so a clone handed to a background task
/// still blocks re-entry from the form that spawned it.
#[derive(Clone)]
pub struct ReportSubmitter {
    store: Arc<dyn DocumentStore>,
    in_flight: Arc<AtomicBool>,
}

impl ReportSubmitter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the in-flight flag for one submission.
    ///
    /// The flag is taken here, not when the write is first polled, so a
    /// second claim made before the first write runs is already refused with
    /// [`SubmitError::InFlight`].
    pub fn begin(&self) -> Result<PendingSubmit, SubmitError> {
        let guard =
            InFlightGuard::acquire(Arc::clone(&self.in_flight)).ok_or(SubmitError::InFlight)?;
        Ok(PendingSubmit {
            store: Arc::clone(&self.store),
            _guard: guard,
        })
    }

    /// Validate `draft` and persist it as a new report at `center`.
    ///
    /// Refused with [`SubmitError::InFlight`] while an earlier call is still
    /// pending. Nothing is written when validation fails.
    pub async fn submit(&self, draft: &ReportDraft, center: Position) -> Result<DocId, SubmitError> {
        self.begin()?.write(draft, center).await
    }
}

/// A claimed submission slot. Dropping it, written or not, frees the slot.
pub struct PendingSubmit {
    store: Arc<dyn DocumentStore>,
    _guard: InFlightGuard,
}

impl PendingSubmit {
    pub async fn write(self, draft: &ReportDraft, center: Position) -> Result<DocId, SubmitError> {
        let report = draft
            .to_new_report(center, chrono::Utc::now())
            .map_err(|e| match e {
                CoreError::Validation(msg) => SubmitError::Validation(msg),
                other => SubmitError::Validation(other.to_string()),
            })?;
        let body = serde_json::to_value(&report)?;

        let id = self.store.add_document(COLLECTION_REPORTS, body).await?;
        tracing::info!(report_id = %id, kind = report.kind.as_str(), "Report submitted");
        Ok(id)
    }
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
