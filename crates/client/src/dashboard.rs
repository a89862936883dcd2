//! Officials dashboard: headline stats, bottlenecks, charts and the
//! status-filtered map.
//!
//! Stats, bottlenecks and charts always describe the full mirrors; the
//! status filter narrows only the lists and the markers.

use std::sync::Arc;

use citypulse_core::filter::{Selection, StatusFilter};
use citypulse_core::presentation::{
    markers, projects_by_status, reports_by_type, Callout, ChartSeries, Marker, MarkerKind,
    Viewport,
};
use citypulse_core::project::Project;
use citypulse_core::report::Report;
use citypulse_core::stats::{bottlenecks, Bottleneck, DashboardStats};
use citypulse_core::types::Position;
use citypulse_store::DocumentStore;
use serde::Serialize;
use ts_rs::TS;

use crate::sync::{LiveSync, SyncEvent};
use crate::view::find_selected;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DashboardViewModel {
    #[ts(type = "string")]
    pub filter: StatusFilter,
    pub stats: DashboardStats,
    pub bottlenecks: Vec<Bottleneck>,
    pub projects: Vec<Project>,
    pub reports: Vec<Report>,
    pub markers: Vec<Marker>,
    pub callout: Option<Callout>,
    pub viewport: Viewport,
    pub reports_by_type: ChartSeries,
    pub projects_by_status: ChartSeries,
}

pub struct OfficialsDashboard {
    sync: LiveSync,
    projects: Vec<Project>,
    reports: Vec<Report>,
    stats: DashboardStats,
    bottlenecks: Vec<Bottleneck>,
    filter: StatusFilter,
    selection: Selection,
    viewport: Viewport,
    projects_loaded: bool,
    reports_loaded: bool,
}

impl OfficialsDashboard {
    pub async fn mount(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            sync: LiveSync::officials(store.as_ref()).await,
            projects: Vec::new(),
            reports: Vec::new(),
            stats: DashboardStats::default(),
            bottlenecks: Vec::new(),
            filter: StatusFilter::All,
            selection: Selection::default(),
            viewport: Viewport::default(),
            projects_loaded: false,
            reports_loaded: false,
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

    /// Step until both mirrors have received their first snapshot.
    ///
    /// Returns `false` if sync ended before that happened.
    pub async fn load(&mut self) -> bool {
        while !self.is_loaded() {
            if !self.step().await {
                return false;
            }
        }
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.projects_loaded && self.reports_loaded
    }

    /// Replace a mirror and recompute every derived figure.
    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Projects(projects) => {
                self.projects = projects;
                self.projects_loaded = true;
                self.bottlenecks = bottlenecks(&self.projects);
            }
            SyncEvent::Reports(reports) => {
                self.reports = reports;
                self.reports_loaded = true;
            }
            SyncEvent::AlertsAdded(_) => return,
        }
        self.stats = DashboardStats::compute(&self.projects, &self.reports);
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn filtered_projects(&self) -> Vec<&Project> {
        self.filter.projects(&self.projects)
    }

    pub fn filtered_reports(&self) -> Vec<&Report> {
        self.filter.reports(&self.reports)
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    pub fn bottlenecks(&self) -> &[Bottleneck] {
        &self.bottlenecks
    }

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

    pub fn move_camera(&mut self, center: Position, zoom: f64) {
        self.viewport = Viewport { center, zoom };
    }

    pub fn view_model(&self) -> DashboardViewModel {
        let projects = self.filtered_projects();
        let reports = self.filtered_reports();
        DashboardViewModel {
            filter: self.filter,
            stats: self.stats,
            bottlenecks: self.bottlenecks.clone(),
            markers: markers(projects.iter().copied(), reports.iter().copied()),
            projects: projects.into_iter().cloned().collect(),
            reports: reports.into_iter().cloned().collect(),
            callout: self.selection.get().map(Callout::from),
            viewport: self.viewport,
            reports_by_type: reports_by_type(&self.reports),
            projects_by_status: projects_by_status(&self.projects),
        }
    }

    pub fn unmount(self) {
        self.sync.release();
    }
}
