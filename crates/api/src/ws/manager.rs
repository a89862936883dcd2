use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use citypulse_core::session::View;
use citypulse_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};

/// Outbound half of a live view's socket queue.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// A registered live view.
pub struct WsConnection {
    pub view: View,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Point-in-time tally of the registered live views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewCensus {
    pub citizen: usize,
    pub officials: usize,
    /// Registration time of the longest-lived connection.
    pub oldest: Option<Timestamp>,
}

impl ViewCensus {
    pub fn total(&self) -> usize {
        self.citizen + self.officials
    }
}

/// Registry of live-view sockets, keyed by connection id.
///
/// Live views push through [`WsManager::send_to`]; a `false` return tells the
/// view its socket is gone and it should wind down.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection and hand back the queue its socket task drains.
    pub async fn add(&self, conn_id: String, view: View) -> mpsc::UnboundedReceiver<Message> {
        let (sender, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            view,
            sender,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Queue a message for one connection.
    ///
    /// Returns `false` if the connection was removed, cleared by
    /// [`WsManager::shutdown_all`], or its socket task has stopped draining.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        match self.connections.read().await.get(conn_id) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn census(&self) -> ViewCensus {
        let conns = self.connections.read().await;
        conns.values().fold(ViewCensus::default(), |mut census, conn| {
            match conn.view {
                View::Citizen => census.citizen += 1,
                View::Officials => census.officials += 1,
            }
            census.oldest = Some(match census.oldest {
                Some(oldest) => oldest.min(conn.connected_at),
                None => conn.connected_at,
            });
            census
        })
    }

    /// Send a Close frame to every connection, then forget them all.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all live-view connections");
    }

    /// Ping every connection; stale sockets surface as send failures in
    /// their own task.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
