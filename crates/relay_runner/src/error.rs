//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while running a local process.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process timeout after {0} seconds")]
    Timeout(u64),

    #[error("Failed to wait for process: {0}")]
    Wait(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
