//! Runtime dispatch and execution errors.

use thiserror::Error;

use flowrun_core::CoreError;

/// Errors raised by runtime resolution and execution.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No runtime registered for a function kind.
    #[error("no runtime registered for function kind '{0}'")]
    UnknownRuntime(String),

    /// Task kind outside the runtime's supported set.
    #[error("task kind '{task}' not supported by the {runtime} runtime")]
    UnsupportedTask { task: String, runtime: String },

    /// A function kind was registered twice.
    #[error("duplicate runtime registration for function kind '{0}'")]
    DuplicateRuntime(String),

    /// External engine failure or result-shape mismatch.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Domain error surfaced while handling a run.
    #[error(transparent)]
    Core(#[from] CoreError),
}
