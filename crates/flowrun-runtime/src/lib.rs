//! Runtime abstraction for Flowrun.
//!
//! A [`Runtime`] executes runs of one function kind. It is resolved
//! fresh from the [`RuntimeRegistry`] at each protocol step, merges
//! specs during `build`, and performs the actual work during `run`,
//! routing on the task kind decoded from the run's task reference.
//! New execution backends plug in through the registry without
//! touching the run entity.

pub mod error;
pub mod registry;

use async_trait::async_trait;
use serde_json::{Map, Value};

use flowrun_core::{Function, RunDocument, Task};

pub use error::RuntimeError;
pub use registry::{RuntimeRegistry, RuntimeRegistryBuilder};

/// Pluggable executor for a function kind.
#[async_trait]
pub trait Runtime: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Task kinds this runtime can execute.
    fn supported_tasks(&self) -> &'static [&'static str];

    /// Merge Function, Task and Run specs into the effective run spec.
    ///
    /// Later layers win on key collision, so task-level settings
    /// override function defaults and run-level settings override both.
    fn build(
        &self,
        function: &Function,
        task: &Task,
        run: &RunDocument,
    ) -> Result<Map<String, Value>, RuntimeError> {
        let run_spec = run.spec_map()?;
        Ok(merge_specs([&function.spec, &task.spec, &run_spec]))
    }

    /// Execute the run and return its new status payload.
    async fn run(&self, run: &RunDocument) -> Result<Value, RuntimeError>;
}

/// Shallow-merge spec mappings; later layers override earlier keys.
pub fn merge_specs<'a>(
    layers: impl IntoIterator<Item = &'a Map<String, Value>>,
) -> Map<String, Value> {
    let mut merged = Map::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
