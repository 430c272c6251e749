//! Errors surfaced by the run protocol.

use thiserror::Error;

use flowrun_client::ClientError;
use flowrun_core::CoreError;
use flowrun_runtime::RuntimeError;

/// Errors that can occur while driving a run.
#[derive(Debug, Error)]
pub enum Error {
    /// Domain error: malformed reference, protocol order, missing result.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Backend client error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Runtime resolution or execution error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Export file could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
