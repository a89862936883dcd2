use crate::types::DocId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DocId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed {entity} document {id}: {reason}")]
    Malformed {
        entity: &'static str,
        id: DocId,
        reason: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
