use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use citypulse_client::{GateError, SubmitError};
use citypulse_core::error::CoreError;
use citypulse_store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and the controller errors of the
/// client crate, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `citypulse_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A session gate outcome; its message is shown verbatim.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// A failed report submission.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// A document store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The store did not answer in time.
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Session gate ---
            AppError::Gate(gate) => match gate {
                GateError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", gate.to_string())
                }
                GateError::AccessRestricted => {
                    (StatusCode::FORBIDDEN, "ACCESS_RESTRICTED", gate.to_string())
                }
                GateError::NotPrivileged => {
                    (StatusCode::FORBIDDEN, "NOT_PRIVILEGED", gate.to_string())
                }
            },

            // --- Report submission ---
            AppError::Submit(submit) => match submit {
                SubmitError::InFlight => (StatusCode::CONFLICT, "IN_FLIGHT", submit.to_string()),
                SubmitError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                SubmitError::Encode(err) => {
                    tracing::error!(error = %err, "Report encoding error");
                    internal()
                }
                SubmitError::Store(err) => classify_store_error(err),
            },

            // --- Store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::UpstreamTimeout(msg) => {
                tracing::warn!(error = %msg, "Store timeout");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "STORE_TIMEOUT",
                    "The data store did not respond in time".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Malformed { .. } => {
            tracing::error!(error = %err, "Malformed document");
            internal()
        }
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - `NotFound` maps to 404.
/// - `InvalidDocument` maps to 400.
/// - `Unavailable` maps to 502 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        StoreError::InvalidDocument { reason, .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_DOCUMENT", reason.clone())
        }
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "Store unavailable");
            (
                StatusCode::BAD_GATEWAY,
                "STORE_UNAVAILABLE",
                "The data store is unavailable".to_string(),
            )
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
