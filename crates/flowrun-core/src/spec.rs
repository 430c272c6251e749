//! Run specification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::ids::TaskId;
use crate::taskref::TaskReference;

/// Specification of a Run.
///
/// After `build`, the spec is replaced wholesale by the merged
/// Function/Task/Run spec; keys the core does not model land in the
/// extension map instead of becoming ad hoc attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Task reference string binding this run to a Function and Task.
    pub task: String,

    /// Id of the referenced task.
    pub task_id: TaskId,

    /// Named input references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,

    /// Named output references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,

    /// Free-form execution parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,

    /// Whether the run executes in-process instead of on the backend.
    #[serde(default)]
    pub local_execution: bool,

    /// Extension fields contributed by Function/Task specs on merge
    /// (e.g. the SQL source of a transform function).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunSpec {
    /// Create a minimal spec from a task reference string and task id.
    pub fn new(task: impl Into<String>, task_id: TaskId) -> Self {
        Self {
            task: task.into(),
            task_id,
            inputs: None,
            outputs: None,
            parameters: None,
            local_execution: false,
            extra: Map::new(),
        }
    }

    /// Decode the task reference. `task` and `task_id` always describe
    /// the same task, so the parsed reference carries both.
    pub fn task_reference(&self) -> Result<TaskReference, CoreError> {
        TaskReference::parse(&self.task, &self.task_id)
    }

    /// Serialize the spec into a JSON mapping (merge source form).
    pub fn to_map(&self) -> Result<Map<String, Value>, CoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(CoreError::Serialization(
                "run spec did not serialize to a mapping".to_string(),
            )),
            Err(err) => Err(CoreError::Serialization(err.to_string())),
        }
    }

    /// Rebuild the spec from a merged mapping, skipping normal validation.
    ///
    /// The merged shape is already kind-consistent; only structural
    /// mismatches (missing task reference, wrong field types) fail.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, CoreError> {
        serde_json::from_value(Value::Object(map))
            .map_err(|err| CoreError::Serialization(err.to_string()))
    }
}
