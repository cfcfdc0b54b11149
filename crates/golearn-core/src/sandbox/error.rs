//! Errors and outcome classification for sandboxed execution

use thiserror::Error;

/// Reasons an execution request is refused or cannot be carried out.
///
/// A program that runs and fails is not an error; it is reported through
/// [`ExecutionFailure`] on a successful result.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Submitted code was empty or whitespace only.
    #[error("code is empty")]
    EmptyCode,

    /// Submitted code exceeds the configured size limit.
    #[error("code too large ({size} bytes, max {limit})")]
    CodeTooLarge { size: usize, limit: usize },

    /// The scratch workspace could not be prepared.
    #[error("failed to prepare workspace: {0:#}")]
    Workspace(#[source] anyhow::Error),
}

impl ExecutionError {
    /// Whether the request itself was invalid (as opposed to a server-side fault)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExecutionError::EmptyCode | ExecutionError::CodeTooLarge { .. }
        )
    }
}

/// How a completed execution went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionFailure {
    /// The wall-clock budget ran out and the process group was killed.
    Timeout { limit_secs: u64 },
    /// The toolchain or the program exited unsuccessfully, or could not start.
    Failed,
}

impl ExecutionFailure {
    /// Stable machine-readable classification
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionFailure::Timeout { .. } => "timeout",
            ExecutionFailure::Failed => "failed",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionFailure::Timeout { .. })
    }
}

impl std::fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionFailure::Timeout { limit_secs } => {
                write!(f, "execution timed out ({}s)", limit_secs)
            }
            ExecutionFailure::Failed => write!(f, "execution error"),
        }
    }
}
