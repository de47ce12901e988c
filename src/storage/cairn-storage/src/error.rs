//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be reached or opened.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A query or write was rejected by the store.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Caller supplied an invalid collection name, filter, or page.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}
