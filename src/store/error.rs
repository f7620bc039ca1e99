//! Store error types
//!
//! Defines all errors that can occur in the node/sensor store.

use thiserror::Error;

/// Errors that can occur in the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed (seed file loading)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),

    /// A record points at a node that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Saving a node would turn the tree into a cyclic graph
    #[error("Cycle detected: {0}")]
    Cycle(String),

    /// Stored data violates the tree invariant (e.g. parent chain loops)
    #[error("Corrupt data: {0}")]
    Corruption(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
