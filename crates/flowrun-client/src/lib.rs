//! Backend client library for Flowrun.
//!
//! Provides the [`BackendClient`] trait the orchestration core persists
//! through, an HTTP implementation for a remote backend, and an
//! in-memory implementation backing local mode and tests.

pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod http;
pub mod local;

use async_trait::async_trait;
use serde_json::Value;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpClient;
pub use local::LocalClient;

/// Generic REST-style object store keyed by entity-type path and id.
///
/// Paths already embed ids where an operation targets a single object;
/// see the [`api`] module for path construction.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Create an object under a collection path. Returns the stored
    /// representation, including its id.
    async fn create_object(&self, path: &str, payload: Value) -> Result<Value, ClientError>;

    /// Read an object by path.
    async fn read_object(&self, path: &str) -> Result<Value, ClientError>;

    /// Replace an object by path.
    async fn update_object(&self, path: &str, payload: Value) -> Result<Value, ClientError>;
}
