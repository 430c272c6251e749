//! Run lifecycle states and the status attached to a run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::CoreError;

/// Lifecycle state of a Run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// Run created but not yet built.
    #[default]
    Created,
    /// Run built and ready to execute.
    Pending,
    /// Run actively executing. Runtimes that cannot report an
    /// intermediate state skip it.
    Running,
    /// Run completed successfully.
    Completed,
    /// Run failed.
    Error,
}

impl State {
    /// Returns true if the run is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Returns true if `build` may be invoked from this state.
    ///
    /// Rebuilding is allowed from every state except `Running`, so a
    /// finished or mis-built run can be retried.
    pub fn can_build(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Returns true if `execute` may be invoked from this state.
    pub fn can_execute(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an entity produced by a run, as recorded in its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRef {
    /// Output key the entity was produced under.
    pub key: String,

    /// Kind of the produced entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Store key or id resolving the entity in the backend.
    pub id: String,
}

/// Status of a Run: current state plus the free-form result payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    /// Current lifecycle state.
    #[serde(default)]
    pub state: State,

    /// Failure message, present iff state is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Artifacts produced by the run, present iff state is `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<ResultRef>>,

    /// Dataitems produced by the run, present iff state is `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataitems: Option<Vec<ResultRef>>,

    /// Extension fields (timings, runtime-specific results).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunStatus {
    /// Status holding only a state.
    pub fn with_state(state: State) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Terminal error status with a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: State::Error,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Build a status from a runtime-supplied payload.
    ///
    /// The payload must be a structured mapping with a known `state`;
    /// anything else is rejected.
    pub fn from_payload(payload: Value) -> Result<Self, CoreError> {
        if !payload.is_object() {
            return Err(CoreError::InvalidStatus(
                "status must be a mapping".to_string(),
            ));
        }
        serde_json::from_value(payload).map_err(|err| CoreError::InvalidStatus(err.to_string()))
    }

    /// Serialize the status back into a JSON mapping.
    pub fn to_payload(&self) -> Result<Value, CoreError> {
        serde_json::to_value(self).map_err(|err| CoreError::Serialization(err.to_string()))
    }
}
