//! Task documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::TaskId;

/// A Task as stored in the backend: a binding of a Function to an
/// execution profile, referenced by runs through the task reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,

    /// Task kind.
    pub kind: String,

    /// Project the task belongs to.
    pub project: String,

    /// Execution profile merged into every run of this task.
    #[serde(default)]
    pub spec: Map<String, Value>,

    /// Fields this core does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
