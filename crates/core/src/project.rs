//! Infrastructure projects mirrored from the `projects` collection.
//!
//! Projects are created and mutated by municipal tooling outside this
//! client; here they are read-only.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::{DocId, Position};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Name of the store collection holding projects.
pub const COLLECTION_PROJECTS: &str = "projects";

pub const STATUS_PLANNED: &str = "planned";
pub const STATUS_ONGOING: &str = "ongoing";
pub const STATUS_COMPLETED: &str = "completed";

/// All valid project status strings, in chart order.
pub const VALID_PROJECT_STATUSES: &[&str] = &[STATUS_PLANNED, STATUS_ONGOING, STATUS_COMPLETED];

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ProjectStatus {
    Planned,
    Ongoing,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [Self::Planned, Self::Ongoing, Self::Completed];

    /// Convert from a stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_PLANNED => Ok(Self::Planned),
            STATUS_ONGOING => Ok(Self::Ongoing),
            STATUS_COMPLETED => Ok(Self::Completed),
            _ => Err(CoreError::Validation(format!(
                "Invalid project status '{s}'. Must be one of: {}",
                VALID_PROJECT_STATUSES.join(", ")
            ))),
        }
    }

    /// Convert to the stored string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => STATUS_PLANNED,
            Self::Ongoing => STATUS_ONGOING,
            Self::Completed => STATUS_COMPLETED,
        }
    }

    /// Chart label ("Planned", "Ongoing", "Completed").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::Ongoing => "Ongoing",
            Self::Completed => "Completed",
        }
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A single infrastructure project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Project {
    /// Store-assigned document id (not part of the stored body).
    #[serde(default)]
    pub id: DocId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form category tag, e.g. `"road"` or `"transit"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ProjectStatus,
    pub position: Position,
}

impl Project {
    /// Decode a project from a store document body.
    pub fn from_document(id: &str, data: serde_json::Value) -> Result<Self, CoreError> {
        let mut project: Project =
            serde_json::from_value(data).map_err(|e| CoreError::Malformed {
                entity: "project",
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        project.id = id.to_string();
        Ok(project)
    }

    pub fn is_ongoing(&self) -> bool {
        self.status == ProjectStatus::Ongoing
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
