//! Live-query payloads: the full document set plus the delta since the
//! previous delivery.

use citypulse_core::types::DocId;
use serde::{Deserialize, Serialize};

/// A stored document: store-assigned id plus its JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub data: serde_json::Value,
}

impl Document {
    pub fn new(id: impl Into<DocId>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// How a document changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One entry of a snapshot delta.
///
/// For `Removed` changes `doc` carries the last known body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub kind: ChangeKind,
    pub doc: Document,
}

impl DocumentChange {
    pub fn added(doc: Document) -> Self {
        Self {
            kind: ChangeKind::Added,
            doc,
        }
    }

    pub fn modified(doc: Document) -> Self {
        Self {
            kind: ChangeKind::Modified,
            doc,
        }
    }

    pub fn removed(doc: Document) -> Self {
        Self {
            kind: ChangeKind::Removed,
            doc,
        }
    }
}

/// One delivery of a live query.
///
/// `docs` is always the complete current result set. `changes` lists what
/// changed since the previous delivery; in the first delivery every
/// existing document appears as `Added`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub docs: Vec<Document>,
    pub changes: Vec<DocumentChange>,
}

impl Snapshot {
    /// Documents marked `Added` in this delivery's delta.
    pub fn added(&self) -> impl Iterator<Item = &Document> {
        self.changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Added)
            .map(|c| &c.doc)
    }
}
