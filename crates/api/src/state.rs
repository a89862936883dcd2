use std::sync::Arc;

use citypulse_events::SystemNotifier;
use citypulse_store::{DocumentStore, MemoryAuth};
use tokio_util::sync::CancellationToken;

use crate::auth::revocation::TokenRevocations;
use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Document store backing every live query and report write.
    pub store: Arc<dyn DocumentStore>,
    /// Account table; each login gets its own session over it.
    pub auth: MemoryAuth,
    /// Delivery channel for alert notifications raised by citizen views.
    pub notifier: Arc<dyn SystemNotifier>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live-view WebSocket connections.
    pub ws_manager: Arc<WsManager>,
    /// Token ids revoked by logout.
    pub revocations: Arc<TokenRevocations>,
    /// Cancelled on shutdown; live views release their queries and exit.
    pub shutdown: CancellationToken,
}
