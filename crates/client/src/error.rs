use citypulse_core::session::{MSG_ACCESS_RESTRICTED, MSG_INVALID_CREDENTIALS};
use citypulse_store::StoreError;

/// Outcomes of the session gate that the user gets to see.
///
/// The `Display` text is the exact message shown; underlying causes are only
/// logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("{}", MSG_INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("{}", MSG_ACCESS_RESTRICTED)]
    AccessRestricted,

    /// A switch to the officials view without a privileged session.
    #[error("Sign in as an authorized official to open the dashboard")]
    NotPrivileged,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Another submission from the same form has not completed yet.
    #[error("A submission is already in progress")]
    InFlight,

    #[error("{0}")]
    Validation(String),

    #[error("Failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
