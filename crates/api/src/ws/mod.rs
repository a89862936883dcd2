//! WebSocket infrastructure for live views.
//!
//! Provides connection management, heartbeat monitoring, the HTTP upgrade
//! handler, and the per-connection loop that drives a citizen map or an
//! officials dashboard.

mod handler;
mod heartbeat;
pub mod live;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
