//! Runtime registry.
//!
//! Maps function kinds to runtime factories. The registry is populated
//! once at startup through the builder and immutable afterwards, so it
//! can be shared across concurrent run executions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::Runtime;

type RuntimeFactory = Box<dyn Fn() -> Arc<dyn Runtime> + Send + Sync>;

/// Immutable mapping of function kind to runtime factory.
pub struct RuntimeRegistry {
    factories: HashMap<String, RuntimeFactory>,
}

impl RuntimeRegistry {
    /// Start building a registry.
    pub fn builder() -> RuntimeRegistryBuilder {
        RuntimeRegistryBuilder {
            factories: HashMap::new(),
        }
    }

    /// Resolve the runtime for a function kind.
    ///
    /// Invokes the registered factory, so every protocol step gets a
    /// fresh, stateless-per-invocation runtime.
    pub fn resolve(&self, function_kind: &str) -> Result<Arc<dyn Runtime>, RuntimeError> {
        self.factories
            .get(function_kind)
            .map(|factory| factory())
            .ok_or_else(|| RuntimeError::UnknownRuntime(function_kind.to_string()))
    }

    /// Registered function kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

/// Builder validating registrations before the registry is frozen.
pub struct RuntimeRegistryBuilder {
    factories: HashMap<String, RuntimeFactory>,
}

impl RuntimeRegistryBuilder {
    /// Register a runtime factory for a function kind.
    ///
    /// Duplicate kinds are rejected here, at registration time.
    pub fn register<F>(
        mut self,
        function_kind: impl Into<String>,
        factory: F,
    ) -> Result<Self, RuntimeError>
    where
        F: Fn() -> Arc<dyn Runtime> + Send + Sync + 'static,
    {
        let kind = function_kind.into();
        if self.factories.contains_key(&kind) {
            return Err(RuntimeError::DuplicateRuntime(kind));
        }
        self.factories.insert(kind, Box::new(factory));
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> RuntimeRegistry {
        RuntimeRegistry {
            factories: self.factories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flowrun_core::RunDocument;
    use serde_json::{json, Value};

    struct NoopRuntime;

    #[async_trait]
    impl Runtime for NoopRuntime {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn supported_tasks(&self) -> &'static [&'static str] {
            &["noop"]
        }

        async fn run(&self, _run: &RunDocument) -> Result<Value, RuntimeError> {
            Ok(json!({"state": "COMPLETED"}))
        }
    }

    fn registry() -> RuntimeRegistry {
        RuntimeRegistry::builder()
            .register("noop", || Arc::new(NoopRuntime))
            .unwrap()
            .build()
    }

    #[test]
    fn test_resolve_registered_kind() {
        let runtime = registry().resolve("noop").unwrap();
        assert_eq!(runtime.name(), "noop");
    }

    #[test]
    fn test_resolve_unknown_kind() {
        let err = registry().resolve("spark").err().unwrap();
        assert!(matches!(err, RuntimeError::UnknownRuntime(kind) if kind == "spark"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let err = RuntimeRegistry::builder()
            .register("noop", || Arc::new(NoopRuntime))
            .unwrap()
            .register("noop", || Arc::new(NoopRuntime))
            .err()
            .unwrap();
        assert!(matches!(err, RuntimeError::DuplicateRuntime(_)));
    }
}
