use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use citypulse_core::error::CoreError;
use citypulse_core::session::View;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OfficialUser};
use crate::state::AppState;
use crate::ws::live;

/// Query parameters of the live-view upgrade request.
///
/// Browsers cannot set headers on a WebSocket handshake, so the officials
/// view takes its access token as a query parameter.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    pub view: View,
    pub token: Option<String>,
}

/// HTTP handler that upgrades the connection to a live view.
///
/// The citizen view is public. The officials view is authorized before the
/// upgrade, so a rejected client gets a plain 401/403 response.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> AppResult<Response> {
    if params.view == View::Officials {
        let token = params.token.as_deref().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "The officials view requires a token".into(),
            ))
        })?;
        let OfficialUser(user) = OfficialUser::admit(AuthUser::from_token(token, &state).await?)?;
        tracing::debug!(uid = %user.uid, "Officials live view authorized");
    }

    let view = params.view;
    Ok(ws
        .on_upgrade(move |socket| live::run(socket, view, state))
        .into_response())
}
