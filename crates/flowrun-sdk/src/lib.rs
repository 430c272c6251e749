//! Run entity and execution protocol for Flowrun.
//!
//! The [`Run`] entity is the orchestration unit: it binds a Function and
//! a Task through a task reference, owns the build→execute protocol
//! sequencing, and persists itself through the backend client. Runtimes
//! are resolved per step from the registry carried by the [`Context`].

pub mod context;
pub mod error;
pub mod run;

pub use context::Context;
pub use error::Error;
pub use run::Run;

// Re-export the domain types callers interact with.
pub use flowrun_client::{BackendClient, ClientConfig, HttpClient, LocalClient};
pub use flowrun_core::{
    Artifact, Dataitem, RunId, RunStatus, State, StoreKey, TaskId, TaskReference,
};
pub use flowrun_runtime::{Runtime, RuntimeRegistry};
