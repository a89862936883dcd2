//! Handlers for the `/session` resource (login, current session, logout).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use citypulse_client::SessionGate;
use citypulse_core::session::{Identity, View};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /session/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: a token for the officials surfaces.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub email: String,
    pub view: View,
}

/// The session a token restores.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub privileged: bool,
    pub view: View,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/session/login
///
/// Authenticate with email and password through the session gate. Only
/// allow-listed accounts get a token; everyone else is signed straight back
/// out and sees the access-restricted message.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let mut gate = SessionGate::new(Arc::new(state.auth.new_session()));
    let identity = gate.login(&input.email, &input.password).await?.clone();

    // The gate only admits identities that carry an allow-listed email.
    let email = identity
        .email
        .ok_or_else(|| AppError::InternalError("Admitted identity has no email".into()))?;

    let access_token = generate_access_token(&identity.uid, &email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(uid = %identity.uid, "Official signed in");

    Ok(Json(LoginResponse {
        access_token,
        expires_in: state.config.jwt.expires_in(),
        email,
        view: gate.view(),
    }))
}

/// GET /api/v1/session
///
/// Restore the session behind a token. The identity is re-checked against
/// the allow-list, as on any observed auth state change.
pub async fn current(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<SessionInfo>> {
    let mut gate = SessionGate::new(Arc::new(state.auth.new_session()));
    gate.on_auth_state(Some(Identity {
        uid: user.uid,
        email: Some(user.email),
    }));

    let session = gate.session();
    Ok(Json(SessionInfo {
        uid: session.map(|s| s.uid.clone()),
        email: session.and_then(|s| s.email.clone()),
        privileged: gate.is_privileged(),
        view: if gate.is_privileged() {
            View::Officials
        } else {
            gate.view()
        },
    }))
}

/// POST /api/v1/session/logout
///
/// Revoke the presented token. Requires authentication.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.revocations.revoke(&user.jti, user.exp).await;
    tracing::info!(uid = %user.uid, "Official signed out");
    Ok(StatusCode::NO_CONTENT)
}
