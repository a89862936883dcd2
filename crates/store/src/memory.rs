//! In-process document store with live queries.
//!
//! Collections are ordered maps from document id to JSON body, guarded by a
//! single `RwLock`. Every committed write bumps a store-wide version and is
//! published on a [`ChangeBus`] while the write lock is still held, so each
//! live query can tell which published batches its initial read already
//! reflects.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use citypulse_core::types::DocId;
use citypulse_events::{ChangeBus, ChangeKind, CollectionChange, Document, DocumentChange, Snapshot};
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};

use crate::document::{DocumentStore, Subscription};
use crate::error::StoreError;

type Collection = BTreeMap<DocId, Value>;

#[derive(Default)]
struct State {
    version: u64,
    collections: HashMap<String, Collection>,
}

struct Inner {
    state: RwLock<State>,
    bus: ChangeBus,
    /// Open live queries per collection.
    listeners: Mutex<HashMap<String, usize>>,
}

/// Cheaply cloneable handle to a shared in-memory store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_bus(ChangeBus::default())
    }

    /// Use a bus with a specific buffer; small buffers make live queries
    /// lag sooner and resynchronize from the store.
    pub fn with_bus(bus: ChangeBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State::default()),
                bus,
                listeners: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Create or overwrite a document with a caller-chosen id.
    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<ChangeKind, StoreError> {
        ensure_object(collection, &data)?;
        let mut state = self.inner.state.write().await;
        let docs = state.collections.entry(collection.to_string()).or_default();
        let kind = match docs.insert(id.to_string(), data.clone()) {
            Some(_) => ChangeKind::Modified,
            None => ChangeKind::Added,
        };
        let change = DocumentChange {
            kind,
            doc: Document::new(id, data),
        };
        self.commit(&mut state, collection, vec![change]);
        Ok(kind)
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut state = self.inner.state.write().await;
        let removed = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        self.commit(
            &mut state,
            collection,
            vec![DocumentChange::removed(Document::new(id, removed))],
        );
        Ok(())
    }

    pub async fn get_document(&self, collection: &str, id: &str) -> Option<Value> {
        let state = self.inner.state.read().await;
        state.collections.get(collection)?.get(id).cloned()
    }

    /// Current contents of a collection, ordered by id.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        let state = self.inner.state.read().await;
        state
            .collections
            .get(collection)
            .map(to_documents)
            .unwrap_or_default()
    }

    /// Number of live queries currently open on `collection`.
    pub fn active_listeners(&self, collection: &str) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .copied()
            .unwrap_or(0)
    }

    /// Bump the version and publish while the caller still holds the write
    /// lock.
    fn commit(&self, state: &mut State, collection: &str, changes: Vec<DocumentChange>) {
        state.version += 1;
        self.inner
            .bus
            .publish(CollectionChange::new(collection, state.version, changes));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn listen(&self, collection: &str) -> Result<Subscription, StoreError> {
        // Subscribe before reading so no commit falls between the two.
        let rx = self.inner.bus.subscribe();
        let (docs, version) = {
            let state = self.inner.state.read().await;
            let docs = state.collections.get(collection).cloned().unwrap_or_default();
            (docs, state.version)
        };

        let initial = Snapshot {
            docs: to_documents(&docs),
            changes: to_documents(&docs)
                .into_iter()
                .map(DocumentChange::added)
                .collect(),
        };
        let query = LiveQuery {
            _guard: ListenerGuard::acquire(&self.inner, collection),
            inner: Arc::clone(&self.inner),
            collection: collection.to_string(),
            rx,
            version,
            docs,
            pending: Some(initial),
        };
        tracing::debug!(collection, version, "Live query opened");

        let stream = futures::stream::unfold(query, |mut query| async move {
            let item = query.next().await?;
            Some((item, query))
        });
        Ok(Subscription::new(collection, stream.boxed()))
    }

    async fn add_document(&self, collection: &str, data: Value) -> Result<DocId, StoreError> {
        ensure_object(collection, &data)?;
        let id = uuid::Uuid::new_v4().to_string();
        let mut state = self.inner.state.write().await;
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data.clone());
        self.commit(
            &mut state,
            collection,
            vec![DocumentChange::added(Document::new(id.clone(), data))],
        );
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Live query
// ---------------------------------------------------------------------------

struct LiveQuery {
    _guard: ListenerGuard,
    inner: Arc<Inner>,
    collection: String,
    rx: broadcast::Receiver<CollectionChange>,
    /// Highest store version reflected in `docs`.
    version: u64,
    docs: Collection,
    pending: Option<Snapshot>,
}

impl LiveQuery {
    async fn next(&mut self) -> Option<Result<Snapshot, StoreError>> {
        if let Some(initial) = self.pending.take() {
            return Some(Ok(initial));
        }

        loop {
            match self.rx.recv().await {
                Ok(batch) => {
                    if batch.collection != self.collection || batch.version <= self.version {
                        continue;
                    }
                    self.version = batch.version;
                    for change in &batch.changes {
                        apply(&mut self.docs, change);
                    }
                    return Some(Ok(Snapshot {
                        docs: to_documents(&self.docs),
                        changes: batch.changes,
                    }));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        collection = %self.collection,
                        skipped,
                        "Live query lagged, resynchronizing from store"
                    );
                    let (current, version) = {
                        let state = self.inner.state.read().await;
                        let docs = state
                            .collections
                            .get(&self.collection)
                            .cloned()
                            .unwrap_or_default();
                        (docs, state.version)
                    };
                    let changes = diff(&self.docs, &current);
                    self.docs = current;
                    self.version = version;
                    if changes.is_empty() {
                        continue;
                    }
                    return Some(Ok(Snapshot {
                        docs: to_documents(&self.docs),
                        changes,
                    }));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// Keeps the per-collection listener count accurate for the lifetime of a
/// live query.
struct ListenerGuard {
    inner: Arc<Inner>,
    collection: String,
}

impl ListenerGuard {
    fn acquire(inner: &Arc<Inner>, collection: &str) -> Self {
        *inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(collection.to_string())
            .or_default() += 1;
        Self {
            inner: Arc::clone(inner),
            collection: collection.to_string(),
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = listeners.get_mut(&self.collection) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                listeners.remove(&self.collection);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ensure_object(collection: &str, data: &Value) -> Result<(), StoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::InvalidDocument {
            collection: collection.to_string(),
            reason: "document body must be a JSON object".into(),
        })
    }
}

fn to_documents(docs: &Collection) -> Vec<Document> {
    docs.iter()
        .map(|(id, data)| Document::new(id.clone(), data.clone()))
        .collect()
}

fn apply(docs: &mut Collection, change: &DocumentChange) {
    match change.kind {
        ChangeKind::Added | ChangeKind::Modified => {
            docs.insert(change.doc.id.clone(), change.doc.data.clone());
        }
        ChangeKind::Removed => {
            docs.remove(&change.doc.id);
        }
    }
}

/// Delta that turns `old` into `new`.
fn diff(old: &Collection, new: &Collection) -> Vec<DocumentChange> {
    let mut changes = Vec::new();
    for (id, data) in new {
        match old.get(id) {
            None => changes.push(DocumentChange::added(Document::new(id.clone(), data.clone()))),
            Some(prev) if prev != data => {
                changes.push(DocumentChange::modified(Document::new(id.clone(), data.clone())))
            }
            Some(_) => {}
        }
    }
    for (id, data) in old {
        if !new.contains_key(id) {
            changes.push(DocumentChange::removed(Document::new(id.clone(), data.clone())));
        }
    }
    changes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    async fn no_delivery(sub: &mut Subscription) -> bool {
        tokio::time::timeout(Duration::from_millis(50), sub.next_snapshot())
            .await
            .is_err()
    }

    #[tokio::test]
    async fn first_delivery_lists_existing_documents_as_added() {
        let store = MemoryStore::new();
        store.set_document("alerts", "a-1", json!({"title": "Flood"})).await.unwrap();
        store.set_document("alerts", "a-2", json!({"title": "Fire"})).await.unwrap();

        let mut sub = store.listen("alerts").await.unwrap();
        let first = sub.next_snapshot().await.unwrap().unwrap();

        assert_eq!(first.docs.len(), 2);
        let added: Vec<_> = first.added().map(|d| d.id.as_str()).collect();
        assert_eq!(added, vec!["a-1", "a-2"]);
    }

    #[tokio::test]
    async fn later_delivery_carries_full_set_and_delta() {
        let store = MemoryStore::new();
        store.set_document("alerts", "a-1", json!({"title": "Flood"})).await.unwrap();
        let mut sub = store.listen("alerts").await.unwrap();
        sub.next_snapshot().await.unwrap().unwrap();

        let id = store.add_document("alerts", json!({"title": "Fire"})).await.unwrap();
        let next = sub.next_snapshot().await.unwrap().unwrap();

        assert_eq!(next.docs.len(), 2);
        assert_eq!(next.changes.len(), 1);
        assert_eq!(next.changes[0].kind, ChangeKind::Added);
        assert_eq!(next.changes[0].doc.id, id);
    }

    #[tokio::test]
    async fn writes_to_other_collections_are_not_delivered() {
        let store = MemoryStore::new();
        let mut sub = store.listen("projects").await.unwrap();
        sub.next_snapshot().await.unwrap().unwrap();

        store.add_document("reports", json!({"x": 1})).await.unwrap();
        assert!(no_delivery(&mut sub).await);
    }

    #[tokio::test]
    async fn overwrite_and_delete_are_reported() {
        let store = MemoryStore::new();
        store.set_document("projects", "p-1", json!({"v": 1})).await.unwrap();
        let mut sub = store.listen("projects").await.unwrap();
        sub.next_snapshot().await.unwrap().unwrap();

        let kind = store.set_document("projects", "p-1", json!({"v": 2})).await.unwrap();
        assert_eq!(kind, ChangeKind::Modified);
        let modified = sub.next_snapshot().await.unwrap().unwrap();
        assert_eq!(modified.changes[0].kind, ChangeKind::Modified);
        assert_eq!(modified.docs[0].data["v"], 2);

        store.delete_document("projects", "p-1").await.unwrap();
        let removed = sub.next_snapshot().await.unwrap().unwrap();
        assert_eq!(removed.changes[0].kind, ChangeKind::Removed);
        assert!(removed.docs.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store.delete_document("projects", "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn non_object_bodies_are_rejected() {
        let store = MemoryStore::new();
        let err = store.add_document("reports", json!("text")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument { .. }));
        assert!(store.documents("reports").await.is_empty());
    }

    #[tokio::test]
    async fn dropping_a_subscription_releases_the_listener() {
        let store = MemoryStore::new();
        let sub = store.listen("reports").await.unwrap();
        let other = store.listen("reports").await.unwrap();
        assert_eq!(store.active_listeners("reports"), 2);

        sub.release();
        assert_eq!(store.active_listeners("reports"), 1);
        drop(other);
        assert_eq!(store.active_listeners("reports"), 0);
    }

    #[tokio::test]
    async fn lagged_query_resynchronizes_with_a_diff() {
        let store = MemoryStore::with_bus(ChangeBus::new(1));
        let mut sub = store.listen("alerts").await.unwrap();
        sub.next_snapshot().await.unwrap().unwrap();

        for n in 0..3 {
            store.add_document("alerts", json!({"n": n})).await.unwrap();
        }

        let resync = sub.next_snapshot().await.unwrap().unwrap();
        assert_eq!(resync.docs.len(), 3);
        assert_eq!(resync.added().count(), 3);
        assert!(no_delivery(&mut sub).await);
    }

    #[test]
    fn diff_detects_all_change_kinds() {
        let old: Collection = [("a".to_string(), json!(1)), ("b".to_string(), json!(2))].into();
        let new: Collection = [("b".to_string(), json!(3)), ("c".to_string(), json!(4))].into();

        let kinds: Vec<_> = diff(&old, &new).into_iter().map(|c| (c.kind, c.doc.id)).collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeKind::Modified, "b".to_string()),
                (ChangeKind::Added, "c".to_string()),
                (ChangeKind::Removed, "a".to_string()),
            ]
        );
    }
}
