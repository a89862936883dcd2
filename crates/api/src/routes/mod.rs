pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws?view=citizen|officials&token=    live view (officials need a token)
///
/// /session                             current session (requires auth)
/// /session/login                       login (public)
/// /session/logout                      logout (requires auth)
///
/// /reports                             submit a report (public)
/// /dashboard?filter=                   dashboard snapshot (officials only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/session", get(handlers::session::current))
        .route("/session/login", post(handlers::session::login))
        .route("/session/logout", post(handlers::session::logout))
        .route("/reports", post(handlers::reports::create_report))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
}
