//! JWT-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use citypulse_core::error::CoreError;
use citypulse_core::session::{AllowList, MSG_ACCESS_RESTRICTED};

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Caller authenticated by a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<StatusCode> {
///     tracing::info!(uid = %user.uid, "handling request");
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account uid (from `claims.sub`).
    pub uid: String,
    pub email: String,
    /// Token id, needed to revoke the token on logout.
    pub jti: String,
    /// Token expiry (UTC Unix timestamp).
    pub exp: i64,
}

impl AuthUser {
    /// Validate a raw token against the signing key and the revocation list.
    pub async fn from_token(token: &str, state: &AppState) -> Result<Self, AppError> {
        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        if state.revocations.is_revoked(&claims.jti).await {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Token has been revoked".into(),
            )));
        }

        Ok(AuthUser {
            uid: claims.sub,
            email: claims.email,
            jti: claims.jti,
            exp: claims.exp,
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        AuthUser::from_token(token, state).await
    }
}

/// An authenticated caller whose email is on the privileged allow-list.
///
/// The allow-list is re-checked on every request, so a token minted before
/// the list changed stops working immediately.
#[derive(Debug, Clone)]
pub struct OfficialUser(pub AuthUser);

impl OfficialUser {
    pub fn admit(user: AuthUser) -> Result<Self, AppError> {
        if AllowList::default().admits_email(&user.email) {
            Ok(Self(user))
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                MSG_ACCESS_RESTRICTED.into(),
            )))
        }
    }
}

impl FromRequestParts<AppState> for OfficialUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        OfficialUser::admit(user)
    }
}
