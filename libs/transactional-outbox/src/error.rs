//! Error types for the transactional outbox library.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for outbox operations.
pub type OutboxResult<T> = Result<T, OutboxError>;

/// Errors that can occur during outbox operations.
#[derive(Error, Debug)]
pub enum OutboxError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Record not found in outbox
    #[error("Outbox record not found: {0}")]
    RecordNotFound(Uuid),

    /// Status column held a value outside {pending, sent, failed}
    #[error("Invalid outbox status: {0}")]
    InvalidStatus(String),

    /// Notifier call failed
    #[error("Notify failed: {0}")]
    NotifyFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error with context
    #[error("Outbox error: {0}")]
    Other(#[from] anyhow::Error),
}
