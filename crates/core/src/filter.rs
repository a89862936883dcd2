//! Status filter and single-item selection for the map and lists.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::project::{Project, ProjectStatus, VALID_PROJECT_STATUSES};
use crate::report::{Report, ReportStatus, VALID_REPORT_STATUSES};

pub const FILTER_ALL: &str = "all";

// ---------------------------------------------------------------------------
// StatusFilter
// ---------------------------------------------------------------------------

/// Either everything, or one status drawn from the union of project and
/// report statuses.
///
/// A filter naming a project status hides every report, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(&'static str),
}

impl StatusFilter {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if s == FILTER_ALL {
            return Ok(Self::All);
        }
        VALID_PROJECT_STATUSES
            .iter()
            .chain(VALID_REPORT_STATUSES)
            .find(|status| **status == s)
            .map(|status| Self::Only(*status))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid filter '{s}'. Must be '{FILTER_ALL}' or one of: {}, {}",
                    VALID_PROJECT_STATUSES.join(", "),
                    VALID_REPORT_STATUSES.join(", ")
                ))
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => FILTER_ALL,
            Self::Only(status) => *status,
        }
    }

    pub fn matches(&self, status: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }

    pub fn matches_project(&self, status: ProjectStatus) -> bool {
        self.matches(status.as_str())
    }

    pub fn matches_report(&self, status: ReportStatus) -> bool {
        self.matches(status.as_str())
    }

    pub fn projects<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects
            .iter()
            .filter(|p| self.matches_project(p.status))
            .collect()
    }

    pub fn reports<'a>(&self, reports: &'a [Report]) -> Vec<&'a Report> {
        reports
            .iter()
            .filter(|r| self.matches_report(r.status))
            .collect()
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// Equivalent to `#[serde(try_from = "String")]`, written by hand because the
// derive infers a `'de: 'static` bound from the `&'static str` field.
impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        filter.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The item currently shown in the detail callout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "item", rename_all = "lowercase")]
#[ts(export)]
pub enum Selected {
    Project(Project),
    Report(Report),
}

/// Holds at most one selected item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection(Option<Selected>);

impl Selection {
    /// Replace whatever was selected before.
    pub fn set(&mut self, item: Selected) {
        self.0 = Some(item);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn get(&self) -> Option<&Selected> {
        self.0.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}
