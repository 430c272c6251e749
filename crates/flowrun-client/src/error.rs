//! Error types for the backend client.

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend rejected the request.
    #[error("backend error: HTTP {status} on {path}")]
    Backend { status: u16, path: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Store key could not be decoded.
    #[error("invalid store key: {0}")]
    InvalidKey(String),

    /// Backend operation attempted on a local-only run.
    #[error("run is local only and has no backend identity")]
    LocalMode,
}
