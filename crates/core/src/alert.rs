//! City-wide alerts and the transient notices shown alongside them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::{DocId, Timestamp};

/// Name of the store collection holding alerts.
pub const COLLECTION_ALERTS: &str = "alerts";

/// Prefix of the system notification title raised for each new alert.
pub const ALERT_NOTIFICATION_PREFIX: &str = "CityPulse Alert: ";

/// An alert published by city staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Alert {
    #[serde(default)]
    pub id: DocId,
    pub title: String,
    pub message: String,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<Timestamp>,
}

impl Alert {
    pub fn from_document(id: &str, data: serde_json::Value) -> Result<Self, CoreError> {
        let mut alert: Alert = serde_json::from_value(data).map_err(|e| CoreError::Malformed {
            entity: "alert",
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        alert.id = id.to_string();
        Ok(alert)
    }

    /// Title used for the system notification.
    pub fn notification_title(&self) -> String {
        format!("{ALERT_NOTIFICATION_PREFIX}{}", self.title)
    }
}

/// Severity of an on-screen notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NoticeKind {
    /// A synced city alert.
    Warning,
    Success,
    Error,
}

/// One dismissible entry in the notice tray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: NoticeKind,
}

impl From<&Alert> for Notice {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.clone(),
            title: alert.title.clone(),
            message: alert.message.clone(),
            kind: NoticeKind::Warning,
        }
    }
}
