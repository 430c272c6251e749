//! External SQL engine collaborator.
//!
//! The transform runtime never talks to a SQL engine directly; it goes
//! through this trait so any compile-and-run engine can be plugged in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use flowrun_core::{Dataitem, RevisionId};

/// Errors reported by the external engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Snapshotting an input table failed.
    #[error("input materialization failed: {0}")]
    Materialize(String),

    /// Engine invocation failed before producing a result.
    #[error("engine invocation failed: {0}")]
    Invocation(String),
}

/// A named input bound to an immutable revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputModel {
    /// Input dataitem name.
    pub name: String,

    /// Revision of the dataitem the transform reads.
    pub revision: RevisionId,
}

impl InputModel {
    /// Versioned table the input is materialized under, so the
    /// transform operates on a reproducible snapshot.
    pub fn table(&self) -> String {
        format!("{}_v{}", self.name, self.revision)
    }
}

/// The output model the engine compiles, bound to a fresh revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputModel {
    /// Output table name.
    pub name: String,

    /// Revision assigned to the produced table.
    pub revision: RevisionId,
}

impl OutputModel {
    /// Versioned table the output is written under.
    pub fn table(&self) -> String {
        format!("{}_v{}", self.name, self.revision)
    }
}

/// Project description handed to the engine: one output model, its
/// input bindings and the SQL source to compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineProject {
    /// Project name; the engine reports it back for validation.
    pub project: String,

    /// Materialized input bindings.
    pub inputs: Vec<InputModel>,

    /// Output binding.
    pub output: OutputModel,

    /// SQL source of the transform.
    pub sql: String,
}

/// Timing of one engine phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTiming {
    /// Phase name, `compile` or `execute`.
    pub name: String,

    /// When the phase started.
    pub started_at: Option<DateTime<Utc>>,

    /// When the phase completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result reported by the engine for one transform invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRunResult {
    /// Engine status string; anything but `success` is a failure.
    pub status: String,

    /// Project the engine believes it ran.
    pub package_name: String,

    /// Output model the engine believes it built.
    pub node_name: String,

    /// Qualified relation the output was written to,
    /// e.g. `"db"."schema"."table"`.
    pub relation_name: String,

    /// Raw SQL source of the model.
    pub raw_code: String,

    /// Compiled SQL actually executed.
    pub compiled_code: String,

    /// Per-phase timings.
    pub timing: Vec<PhaseTiming>,
}

/// A compile-and-run SQL engine.
#[async_trait]
pub trait SqlEngine: Send + Sync {
    /// Snapshot a dataitem into the immutable versioned table the
    /// transform will read.
    async fn materialize(
        &self,
        input: &InputModel,
        dataitem: &Dataitem,
    ) -> Result<(), EngineError>;

    /// Compile and execute the transform described by the project.
    async fn execute(&self, project: &EngineProject) -> Result<EngineRunResult, EngineError>;
}
