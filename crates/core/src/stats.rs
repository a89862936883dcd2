//! Dashboard aggregation: headline counts and the bottleneck list.
//!
//! Everything here is a pure function of the project and report mirrors.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::project::Project;
use crate::report::Report;
use crate::types::DocId;

/// Reason attached to every bottleneck. A placeholder policy: every ongoing
/// project is flagged, no real analysis happens.
pub const BOTTLENECK_REASON: &str = "Extended timeline";

/// Headline counts shown at the top of the officials dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub ongoing_projects: usize,
    pub total_reports: usize,
    /// Reports with status `reported` or `confirmed`.
    pub unresolved_reports: usize,
}

impl DashboardStats {
    pub fn compute(projects: &[Project], reports: &[Report]) -> Self {
        Self {
            total_projects: projects.len(),
            ongoing_projects: projects.iter().filter(|p| p.is_ongoing()).count(),
            total_reports: reports.len(),
            unresolved_reports: reports.iter().filter(|r| r.status.is_unresolved()).count(),
        }
    }
}

/// A project flagged for attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bottleneck {
    pub id: DocId,
    pub name: String,
    /// Always `"project"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
}

/// One bottleneck per ongoing project, in mirror order.
pub fn bottlenecks(projects: &[Project]) -> Vec<Bottleneck> {
    projects
        .iter()
        .filter(|p| p.is_ongoing())
        .map(|p| Bottleneck {
            id: p.id.clone(),
            name: p.name.clone(),
            kind: "project".to_string(),
            reason: BOTTLENECK_REASON.to_string(),
        })
        .collect()
}
