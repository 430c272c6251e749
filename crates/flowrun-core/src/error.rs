//! Core domain errors.

use thiserror::Error;

/// Core domain errors for Flowrun.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Task reference string does not match the documented format.
    #[error("malformed task reference: {0}")]
    MalformedReference(String),

    /// Store key string does not match the documented format.
    #[error("malformed store key: {0}")]
    MalformedStoreKey(String),

    /// Protocol operation called out of order.
    #[error("{0}")]
    InvalidState(String),

    /// Status payload is not a structured mapping, or names an unknown state.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Result retrieval on a run that has not finished.
    #[error("Run has no result yet")]
    NoResult,

    /// Result retrieval with a key that matches no entry.
    #[error("no {entity} found with key '{key}'")]
    NotFound { entity: String, key: String },

    /// Operation declared but not implemented by this core.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// Serialization error while converting a document.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// The canonical error for `execute` called outside the pending state.
    pub fn not_pending() -> Self {
        Self::InvalidState("Run is not in pending state. Build it again.".to_string())
    }
}
