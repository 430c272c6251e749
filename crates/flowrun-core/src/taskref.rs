//! Task reference addressing.
//!
//! A run is bound to a Function and a Task through a compact string of the
//! form `"<functionKind>+<taskKind>://<path>/<functionName>:<functionId>"`.
//! This module is the single source of truth for that format: everything
//! else decodes references through [`TaskReference::parse`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::TaskId;

/// Decoded task reference identifying which Function and Task a run targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReference {
    /// Function kind; selects the Runtime that handles the run.
    pub function_kind: String,

    /// Task kind; must be in the resolved Runtime's supported set.
    pub task_kind: String,

    /// Scheme-specific path (everything between `://` and the last `/`).
    pub path: String,

    /// Name of the referenced function.
    pub function_name: String,

    /// Id of the referenced function.
    pub function_id: String,

    /// Id of the referenced task, carried alongside from the run spec.
    pub task_id: TaskId,
}

impl TaskReference {
    /// Decode a task string, attaching the task id from the run spec.
    ///
    /// Fails with [`CoreError::MalformedReference`] if the string does not
    /// match the documented format exactly: two `+`-joined kind tokens
    /// before `://`, and exactly one `:`-separated name/id pair after the
    /// last `/`.
    pub fn parse(task: &str, task_id: &TaskId) -> Result<Self, CoreError> {
        let malformed = || CoreError::MalformedReference(task.to_string());

        let (kinds, rest) = task.split_once("://").ok_or_else(malformed)?;
        let (function_kind, task_kind) = kinds.split_once('+').ok_or_else(malformed)?;
        if function_kind.is_empty() || task_kind.is_empty() || task_kind.contains('+') {
            return Err(malformed());
        }

        let (path, name_and_id) = rest.rsplit_once('/').ok_or_else(malformed)?;
        if path.is_empty() {
            return Err(malformed());
        }
        let (function_name, function_id) = name_and_id.split_once(':').ok_or_else(malformed)?;
        if function_name.is_empty() || function_id.is_empty() || function_id.contains(':') {
            return Err(malformed());
        }

        Ok(Self {
            function_kind: function_kind.to_string(),
            task_kind: task_kind.to_string(),
            path: path.to_string(),
            function_name: function_name.to_string(),
            function_id: function_id.to_string(),
            task_id: task_id.clone(),
        })
    }
}

impl fmt::Display for TaskReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}+{}://{}/{}:{}",
            self.function_kind, self.task_kind, self.path, self.function_name, self.function_id
        )
    }
}
