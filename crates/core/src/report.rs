//! Citizen issue reports.
//!
//! Reports are created by the submission flow with status `reported`. Any
//! later status change happens outside this client.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::{DocId, Position, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Name of the store collection holding reports.
pub const COLLECTION_REPORTS: &str = "reports";

pub const TYPE_CONGESTION: &str = "congestion";
pub const TYPE_HAZARD: &str = "hazard";
pub const TYPE_OUTAGE: &str = "outage";
pub const TYPE_SEWAGE: &str = "sewage";

/// All valid report types, in chart order.
pub const VALID_REPORT_TYPES: &[&str] = &[TYPE_CONGESTION, TYPE_HAZARD, TYPE_OUTAGE, TYPE_SEWAGE];

pub const STATUS_REPORTED: &str = "reported";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_RESOLVED: &str = "resolved";

/// All valid report status strings.
pub const VALID_REPORT_STATUSES: &[&str] = &[STATUS_REPORTED, STATUS_CONFIRMED, STATUS_RESOLVED];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Category of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ReportType {
    #[default]
    Congestion,
    Hazard,
    Outage,
    Sewage,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [Self::Congestion, Self::Hazard, Self::Outage, Self::Sewage];

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            TYPE_CONGESTION => Ok(Self::Congestion),
            TYPE_HAZARD => Ok(Self::Hazard),
            TYPE_OUTAGE => Ok(Self::Outage),
            TYPE_SEWAGE => Ok(Self::Sewage),
            _ => Err(CoreError::Validation(format!(
                "Invalid report type '{s}'. Must be one of: {}",
                VALID_REPORT_TYPES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Congestion => TYPE_CONGESTION,
            Self::Hazard => TYPE_HAZARD,
            Self::Outage => TYPE_OUTAGE,
            Self::Sewage => TYPE_SEWAGE,
        }
    }

    /// Display label ("Congestion", "Hazard", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Congestion => "Congestion",
            Self::Hazard => "Hazard",
            Self::Outage => "Outage",
            Self::Sewage => "Sewage",
        }
    }
}

/// Triage status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ReportStatus {
    #[default]
    Reported,
    Confirmed,
    Resolved,
}

impl ReportStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_REPORTED => Ok(Self::Reported),
            STATUS_CONFIRMED => Ok(Self::Confirmed),
            STATUS_RESOLVED => Ok(Self::Resolved),
            _ => Err(CoreError::Validation(format!(
                "Invalid report status '{s}'. Must be one of: {}",
                VALID_REPORT_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => STATUS_REPORTED,
            Self::Confirmed => STATUS_CONFIRMED,
            Self::Resolved => STATUS_RESOLVED,
        }
    }

    /// Reported and confirmed reports still need attention.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Reported | Self::Confirmed)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A report as mirrored from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Report {
    #[serde(default)]
    pub id: DocId,
    #[serde(rename = "type")]
    pub kind: ReportType,
    pub description: String,
    pub position: Position,
    pub status: ReportStatus,
    pub timestamp: Timestamp,
}

impl Report {
    /// Decode a report from a store document body.
    pub fn from_document(id: &str, data: serde_json::Value) -> Result<Self, CoreError> {
        let mut report: Report =
            serde_json::from_value(data).map_err(|e| CoreError::Malformed {
                entity: "report",
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        report.id = id.to_string();
        Ok(report)
    }
}

/// Body written to the `reports` collection on submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReport {
    #[serde(rename = "type")]
    pub kind: ReportType,
    pub description: String,
    pub position: Position,
    pub status: ReportStatus,
    pub timestamp: Timestamp,
}

// ---------------------------------------------------------------------------
// Draft (the submission form)
// ---------------------------------------------------------------------------

/// User-editable report form.
///
/// The default is the cleared form: congestion with an empty description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct ReportDraft {
    #[serde(rename = "type")]
    pub kind: ReportType,
    #[validate(custom(function = "validate_non_blank"))]
    pub description: String,
}

impl ReportDraft {
    pub fn new(kind: ReportType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Validate the draft and build the document to persist.
    ///
    /// `center` is the map viewport center at submission time; `now` becomes
    /// the report timestamp.
    pub fn to_new_report(&self, center: Position, now: Timestamp) -> Result<NewReport, CoreError> {
        self.validate()
            .map_err(|_| CoreError::Validation("Description is required".into()))?;
        Ok(NewReport {
            kind: self.kind,
            description: self.description.clone(),
            position: center,
            status: ReportStatus::Reported,
            timestamp: now,
        })
    }
}

fn validate_non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
