//! Execution context shared by entities of one project.

use std::sync::Arc;

use flowrun_client::BackendClient;
use flowrun_runtime::RuntimeRegistry;

/// Project-scoped context: backend client plus runtime registry.
///
/// Cheap to clone; every entity holds one. The registry is immutable
/// after startup, so a context can be shared across concurrent runs.
#[derive(Clone)]
pub struct Context {
    project: String,
    client: Arc<dyn BackendClient>,
    registry: Arc<RuntimeRegistry>,
}

impl Context {
    /// Create a context for a project.
    pub fn new(
        project: impl Into<String>,
        client: Arc<dyn BackendClient>,
        registry: Arc<RuntimeRegistry>,
    ) -> Self {
        Self {
            project: project.into(),
            client,
            registry,
        }
    }

    /// Project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Backend client.
    pub fn client(&self) -> &dyn BackendClient {
        self.client.as_ref()
    }

    /// Runtime registry.
    pub fn registry(&self) -> &RuntimeRegistry {
        &self.registry
    }
}
