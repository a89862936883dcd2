//! Citizen map: live markers, alerts, and the report form.

use std::future::Future;
use std::sync::Arc;

use citypulse_core::alert::Notice;
use citypulse_core::filter::Selection;
use citypulse_core::presentation::{markers, Callout, Marker, MarkerKind, Viewport};
use citypulse_core::project::Project;
use citypulse_core::report::{Report, ReportDraft, ReportType};
use citypulse_core::types::{DocId, Position};
use citypulse_events::SystemNotifier;
use citypulse_store::DocumentStore;
use serde::Serialize;
use ts_rs::TS;

use crate::error::SubmitError;
use crate::submit::ReportSubmitter;
use crate::sync::{LiveSync, SyncEvent};
use crate::tray::{
    NoticeTray, TOAST_FAILED_MESSAGE, TOAST_FAILED_TITLE, TOAST_SUBMITTED_MESSAGE,
    TOAST_SUBMITTED_TITLE,
};
use crate::view::find_selected;

/// Everything the renderer needs to draw the citizen map.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CitizenViewModel {
    pub viewport: Viewport,
    pub markers: Vec<Marker>,
    pub callout: Option<Callout>,
    pub notices: Vec<Notice>,
    pub form: ReportDraft,
    pub form_open: bool,
    pub submitting: bool,
}

pub struct CitizenMap {
    sync: LiveSync,
    submitter: ReportSubmitter,
    projects: Vec<Project>,
    reports: Vec<Report>,
    tray: NoticeTray,
    selection: Selection,
    viewport: Viewport,
    form: ReportDraft,
    form_open: bool,
    /// Set from [`CitizenMap::submission`] until its outcome is applied.
    awaiting_outcome: bool,
}

impl CitizenMap {
    /// Open the live queries and center the camera on the city.
    pub async fn mount(store: Arc<dyn DocumentStore>, notifier: Arc<dyn SystemNotifier>) -> Self {
        let sync = LiveSync::citizen(store.as_ref(), notifier).await;
        Self {
            sync,
            submitter: ReportSubmitter::new(store),
            projects: Vec::new(),
            reports: Vec::new(),
            tray: NoticeTray::new(),
            selection: Selection::default(),
            viewport: Viewport::default(),
            form: ReportDraft::default(),
            form_open: false,
            awaiting_outcome: false,
        }
    }

    pub fn sync_mut(&mut self) -> &mut LiveSync {
        &mut self.sync
    }

    /// Wait for the next sync event and apply it. `false` once sync ended.
    pub async fn step(&mut self) -> bool {
        match self.sync.next_event().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Projects(projects) => self.projects = projects,
            SyncEvent::Reports(reports) => self.reports = reports,
            SyncEvent::AlertsAdded(alerts) => {
                for alert in &alerts {
                    self.tray.push_alert(alert);
                }
            }
        }
    }

    // ----- Form -----

    pub fn open_form(&mut self) {
        self.form_open = true;
    }

    pub fn close_form(&mut self) {
        self.form_open = false;
    }

    pub fn edit_form(&mut self, kind: ReportType, description: impl Into<String>) {
        self.form = ReportDraft::new(kind, description);
    }

    pub fn form(&self) -> &ReportDraft {
        &self.form
    }

    /// A submission of the current form at the current camera center.
    ///
    /// The slot is claimed on this call and held until the outcome goes
    /// through [`CitizenMap::finish_submission`], so a second call in between
    /// resolves to [`SubmitError::InFlight`] without writing. The future owns
    /// its inputs and can run on another task.
    pub fn submission(
        &mut self,
    ) -> impl Future<Output = Result<DocId, SubmitError>> + Send + 'static {
        let pending = if self.awaiting_outcome {
            Err(SubmitError::InFlight)
        } else {
            self.submitter.begin()
        };
        if pending.is_ok() {
            self.awaiting_outcome = true;
        }
        let draft = self.form.clone();
        let center = self.viewport.center;
        async move { pending?.write(&draft, center).await }
    }

    /// Apply a submission outcome to the form and the tray.
    ///
    /// Success clears and closes the form; a store failure keeps the form
    /// for another attempt. Validation failures and refused re-entry leave
    /// everything as it is.
    pub fn finish_submission(&mut self, result: &Result<DocId, SubmitError>) {
        if !matches!(result, Err(SubmitError::InFlight)) {
            self.awaiting_outcome = false;
        }
        match result {
            Ok(_) => {
                self.form = ReportDraft::default();
                self.form_open = false;
                self.tray.push_success(TOAST_SUBMITTED_TITLE, TOAST_SUBMITTED_MESSAGE);
            }
            Err(SubmitError::Store(e)) => {
                tracing::error!(error = %e, "Report submission failed");
                self.tray.push_error(TOAST_FAILED_TITLE, TOAST_FAILED_MESSAGE);
            }
            Err(SubmitError::Encode(e)) => {
                tracing::error!(error = %e, "Report encoding failed");
                self.tray.push_error(TOAST_FAILED_TITLE, TOAST_FAILED_MESSAGE);
            }
            Err(SubmitError::Validation(_) | SubmitError::InFlight) => {}
        }
    }

    /// Submit and apply the outcome in one step.
    pub async fn submit(&mut self) -> Result<DocId, SubmitError> {
        let result = self.submission().await;
        self.finish_submission(&result);
        result
    }

    pub fn is_submitting(&self) -> bool {
        self.awaiting_outcome || self.submitter.is_in_flight()
    }

    // ----- Map -----

    pub fn move_camera(&mut self, center: Position, zoom: f64) {
        self.viewport = Viewport { center, zoom };
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Select a marker by kind and id. Unknown ids leave the selection
    /// unchanged and return `false`.
    pub fn select(&mut self, kind: MarkerKind, id: &str) -> bool {
        match find_selected(&self.projects, &self.reports, kind, id) {
            Some(item) => {
                self.selection.set(item);
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn dismiss(&mut self, notice_id: &str) -> bool {
        self.tray.dismiss(notice_id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn notices(&self) -> &[Notice] {
        self.tray.notices()
    }

    pub fn view_model(&self) -> CitizenViewModel {
        CitizenViewModel {
            viewport: self.viewport,
            markers: markers(&self.projects, &self.reports),
            callout: self.selection.get().map(Callout::from),
            notices: self.tray.notices().to_vec(),
            form: self.form.clone(),
            form_open: self.form_open,
            submitting: self.is_submitting(),
        }
    }

    pub fn unmount(self) {
        self.sync.release();
    }
}
