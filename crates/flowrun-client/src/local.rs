//! In-memory backend for local mode and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::ClientError;
use crate::BackendClient;

/// In-memory object store with the same path layout as the remote
/// backend.
///
/// Created objects are stored both under `<path>/<id>` and under the
/// collection path itself, which then always resolves to the latest
/// revision — the lookup rule versioned dataitems rely on.
#[derive(Default)]
pub struct LocalClient {
    objects: RwLock<HashMap<String, Value>>,
}

impl LocalClient {
    /// Create an empty local store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackendClient for LocalClient {
    async fn create_object(&self, path: &str, payload: Value) -> Result<Value, ClientError> {
        let mut payload = payload;
        let object = payload
            .as_object_mut()
            .ok_or_else(|| ClientError::Serialization("payload must be a mapping".to_string()))?;

        let id = match object.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                object.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        debug!(path = %path, id = %id, "Storing object");

        let mut objects = self.objects.write().await;
        objects.insert(format!("{path}/{id}"), payload.clone());
        objects.insert(path.to_string(), payload.clone());
        Ok(payload)
    }

    async fn read_object(&self, path: &str) -> Result<Value, ClientError> {
        debug!(path = %path, "Reading object");
        self.objects
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(path.to_string()))
    }

    async fn update_object(&self, path: &str, payload: Value) -> Result<Value, ClientError> {
        debug!(path = %path, "Updating object");
        let mut objects = self.objects.write().await;
        if !objects.contains_key(path) {
            return Err(ClientError::NotFound(path.to_string()));
        }
        objects.insert(path.to_string(), payload.clone());
        Ok(payload)
    }
}
