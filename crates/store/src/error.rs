use citypulse_core::types::DocId;

/// Failures of the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: DocId },

    /// Document bodies must be JSON objects.
    #[error("Invalid document for '{collection}': {reason}")]
    InvalidDocument { collection: String, reason: String },

    /// The backend cannot be reached or refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the authentication service.
///
/// Callers facing end users collapse every variant into one generic message;
/// the variants exist for logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No account for '{0}'")]
    UnknownAccount(String),

    #[error("Wrong password")]
    WrongPassword,

    #[error("Account '{0}' already exists")]
    DuplicateAccount(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Auth service unavailable: {0}")]
    Unavailable(String),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Hashing(err.to_string())
    }
}
