//! Projection of mirrored data into renderable map and chart models.
//!
//! Tile rendering, chart drawing and styling belong to the browser renderer;
//! this module only decides what to draw and in which color.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::filter::Selected;
use crate::project::{Project, ProjectStatus};
use crate::report::{Report, ReportType};
use crate::types::{DocId, Position, Timestamp};

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Fixed city center the map snaps to on mount (San Francisco).
pub const CITY_CENTER: Position = Position(37.7749, -122.4194);

/// Zoom level applied together with [`CITY_CENTER`].
pub const DEFAULT_ZOOM: f64 = 11.0;

/// Camera position. The only state the presentation layer owns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Viewport {
    pub center: Position,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: CITY_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MarkerColor {
    Green,
    Orange,
    Blue,
    Red,
}

impl MarkerColor {
    /// completed/resolved → green, ongoing/confirmed → orange,
    /// planned → blue, anything else → red.
    pub fn for_status(status: &str) -> Self {
        match status {
            "completed" | "resolved" => Self::Green,
            "ongoing" | "confirmed" => Self::Orange,
            "planned" => Self::Blue,
            _ => Self::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MarkerKind {
    Project,
    Report,
}

/// One pin on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Marker {
    pub id: DocId,
    pub kind: MarkerKind,
    pub position: Position,
    pub status: String,
    pub color: MarkerColor,
    /// First letter of the item's type, uppercased.
    pub glyph: String,
}

fn glyph(kind: &str) -> String {
    kind.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

impl From<&Project> for Marker {
    fn from(project: &Project) -> Self {
        let status = project.status.as_str();
        Self {
            id: project.id.clone(),
            kind: MarkerKind::Project,
            position: project.position,
            status: status.to_string(),
            color: MarkerColor::for_status(status),
            glyph: glyph(&project.kind),
        }
    }
}

impl From<&Report> for Marker {
    fn from(report: &Report) -> Self {
        let status = report.status.as_str();
        Self {
            id: report.id.clone(),
            kind: MarkerKind::Report,
            position: report.position,
            status: status.to_string(),
            color: MarkerColor::for_status(status),
            glyph: glyph(report.kind.as_str()),
        }
    }
}

/// Markers for the visible projects followed by the visible reports.
pub fn markers<'a>(
    projects: impl IntoIterator<Item = &'a Project>,
    reports: impl IntoIterator<Item = &'a Report>,
) -> Vec<Marker> {
    projects
        .into_iter()
        .map(Marker::from)
        .chain(reports.into_iter().map(Marker::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Callout
// ---------------------------------------------------------------------------

/// Detail popup for the selected marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Callout {
    pub id: DocId,
    pub kind: MarkerKind,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub type_label: String,
    pub status: String,
    pub status_color: MarkerColor,
    pub timestamp: Option<Timestamp>,
}

impl From<&Selected> for Callout {
    fn from(selected: &Selected) -> Self {
        match selected {
            Selected::Project(p) => Self {
                id: p.id.clone(),
                kind: MarkerKind::Project,
                title: p.name.clone(),
                description: p.description.clone(),
                type_label: p.kind.clone(),
                status: p.status.as_str().to_string(),
                status_color: MarkerColor::for_status(p.status.as_str()),
                timestamp: None,
            },
            // Reports carry no name; the type label stands in as the title.
            Selected::Report(r) => Self {
                id: r.id.clone(),
                kind: MarkerKind::Report,
                title: r.kind.label().to_string(),
                description: r.description.clone(),
                type_label: r.kind.as_str().to_string(),
                status: r.status.as_str().to_string(),
                status_color: MarkerColor::for_status(r.status.as_str()),
                timestamp: Some(r.timestamp),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// A fixed-category distribution for a bar or pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartSeries {
    pub label: String,
    pub labels: Vec<String>,
    pub data: Vec<usize>,
}

/// Report counts for each of the four report types.
pub fn reports_by_type(reports: &[Report]) -> ChartSeries {
    ChartSeries {
        label: "Reports by Type".to_string(),
        labels: ReportType::ALL.iter().map(|t| t.label().to_string()).collect(),
        data: ReportType::ALL
            .iter()
            .map(|t| reports.iter().filter(|r| r.kind == *t).count())
            .collect(),
    }
}

/// Project counts for each of the three project statuses.
pub fn projects_by_status(projects: &[Project]) -> ChartSeries {
    ChartSeries {
        label: "Projects by Status".to_string(),
        labels: ProjectStatus::ALL
            .iter()
            .map(|s| s.label().to_string())
            .collect(),
        data: ProjectStatus::ALL
            .iter()
            .map(|s| projects.iter().filter(|p| p.status == *s).count())
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
