use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every live view on a fixed interval until the handle is aborted.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);

        loop {
            interval.tick().await;
            let census = ws_manager.census().await;
            if census.total() == 0 {
                continue;
            }
            let oldest_secs = census
                .oldest
                .map(|at| (chrono::Utc::now() - at).num_seconds())
                .unwrap_or_default();
            tracing::debug!(
                citizen = census.citizen,
                officials = census.officials,
                oldest_secs,
                "Live-view heartbeat"
            );
            ws_manager.ping_all().await;
        }
    })
}
