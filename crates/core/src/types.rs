use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Document ids are assigned by the store and opaque to the client.
pub type DocId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A `[latitude, longitude]` pair.
///
/// Serialized as a two-element array, matching the shape stored in the
/// `projects` and `reports` collections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Position(pub f64, pub f64);

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self(lat, lng)
    }

    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lng(&self) -> f64 {
        self.1
    }
}
