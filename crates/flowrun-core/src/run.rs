//! The persisted representation of a Run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::ids::RunId;
use crate::metadata::RunMetadata;
use crate::spec::RunSpec;
use crate::state::{RunStatus, State};

/// The persisted representation of a Run: identity, spec and status.
///
/// This is the document exchanged with the backend and handed to
/// runtimes; the protocol sequencing around it lives in the sdk crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDocument {
    /// Unique run identifier, immutable once assigned.
    pub id: RunId,

    /// Kind of the run; selects the spec/status variant.
    pub kind: String,

    /// Project the run belongs to.
    pub project: String,

    /// Run metadata.
    pub metadata: RunMetadata,

    /// Run specification.
    pub spec: RunSpec,

    /// Run status.
    #[serde(default)]
    pub status: RunStatus,
}

impl RunDocument {
    /// Create a new run document with a generated id.
    pub fn new(project: impl Into<String>, kind: impl Into<String>, spec: RunSpec) -> Self {
        let id = RunId::generate();
        let project = project.into();
        Self {
            metadata: RunMetadata::new(project.clone(), id.as_str()),
            id,
            kind: kind.into(),
            project,
            spec,
            status: RunStatus::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.status.state
    }

    /// Fail unless `build` is allowed from the current state.
    pub fn ensure_can_build(&self) -> Result<(), CoreError> {
        if self.state().can_build() {
            return Ok(());
        }
        Err(CoreError::InvalidState(
            "Run is currently executing. Wait for it to finish before rebuilding.".to_string(),
        ))
    }

    /// Fail unless `execute` is allowed from the current state.
    pub fn ensure_can_execute(&self) -> Result<(), CoreError> {
        if self.state().can_execute() {
            return Ok(());
        }
        Err(CoreError::not_pending())
    }

    /// Replace the status from a runtime-supplied payload.
    pub fn set_status(&mut self, payload: Value) -> Result<(), CoreError> {
        self.status = RunStatus::from_payload(payload)?;
        Ok(())
    }

    /// The spec as a JSON mapping, for use as a merge source.
    pub fn spec_map(&self) -> Result<Map<String, Value>, CoreError> {
        self.spec.to_map()
    }

    /// Serialize the document.
    pub fn to_value(&self) -> Result<Value, CoreError> {
        serde_json::to_value(self).map_err(|err| CoreError::Serialization(err.to_string()))
    }

    /// Deserialize a document from its backend representation.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(|err| CoreError::Serialization(err.to_string()))
    }
}
