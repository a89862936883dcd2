//! The document-store boundary.
//!
//! A store holds named collections of JSON documents. Clients open live
//! queries with [`DocumentStore::listen`] and append documents with
//! [`DocumentStore::add_document`]. A live query is a [`Subscription`]: a
//! stream of [`Snapshot`]s that stays open until it is released or dropped.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use citypulse_core::types::DocId;
use citypulse_events::Snapshot;
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::error::StoreError;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a live query over a whole collection.
    ///
    /// The first delivery carries every existing document, each listed as
    /// added. Later deliveries carry the full set again plus what changed.
    async fn listen(&self, collection: &str) -> Result<Subscription, StoreError>;

    /// Append a document; the store assigns and returns its id.
    async fn add_document(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> Result<DocId, StoreError>;
}

/// A live query handle.
///
/// Dropping the handle releases the query; [`Subscription::release`] does the
/// same explicitly.
pub struct Subscription {
    collection: String,
    stream: BoxStream<'static, Result<Snapshot, StoreError>>,
}

impl Subscription {
    pub fn new(
        collection: impl Into<String>,
        stream: BoxStream<'static, Result<Snapshot, StoreError>>,
    ) -> Self {
        Self {
            collection: collection.into(),
            stream,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Next delivery, or `None` once the store has shut down.
    pub async fn next_snapshot(&mut self) -> Option<Result<Snapshot, StoreError>> {
        self.stream.next().await
    }

    pub fn release(self) {
        tracing::debug!(collection = %self.collection, "Live query released");
    }
}

impl Stream for Subscription {
    type Item = Result<Snapshot, StoreError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}
