//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] fans out every committed write of a document store to all
//! live queries. It is designed to be shared via `Arc` by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::snapshot::DocumentChange;

// ---------------------------------------------------------------------------
// CollectionChange
// ---------------------------------------------------------------------------

/// A batch of document changes committed to one collection.
///
/// `version` increases by one per committed batch across the whole store,
/// so a listener can discard changes already reflected in a snapshot it read
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionChange {
    /// Collection name, e.g. `"reports"`.
    pub collection: String,

    /// Store-wide commit version of this batch.
    pub version: u64,

    pub changes: Vec<DocumentChange>,

    /// When the batch was committed (UTC).
    pub timestamp: DateTime<Utc>,
}

impl CollectionChange {
    pub fn new(collection: impl Into<String>, version: u64, changes: Vec<DocumentChange>) -> Self {
        Self {
            collection: collection.into(),
            version,
            changes,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out of committed changes.
///
/// # Usage
///
/// ```rust
/// use citypulse_events::bus::{ChangeBus, CollectionChange};
///
/// let bus = ChangeBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(CollectionChange::new("alerts", 1, vec![]));
/// ```
pub struct ChangeBus {
    sender: broadcast::Sender<CollectionChange>,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed batches are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a batch to all current subscribers.
    ///
    /// With no live queries open the batch is silently dropped; the store
    /// itself already holds the committed state.
    pub fn publish(&self, change: CollectionChange) {
        let _ = self.sender.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChange> {
        self.sender.subscribe()
    }

    /// Number of receivers currently attached.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
