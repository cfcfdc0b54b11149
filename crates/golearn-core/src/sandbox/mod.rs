//! Sandboxed code execution — run submitted snippets in disposable workspaces
//!
//! Each call to [`CodeExecutor::execute`] writes the source into a fresh
//! directory, runs the configured toolchain against it under a wall-clock
//! deadline, captures combined output, and removes the directory again.
//!
//! This is not an isolation boundary: the child runs with the server's
//! privileges, filesystem, and network. Only the deadline is enforced.

pub mod error;
pub mod executor;
pub mod policy;
pub mod process;
pub mod workspace;

pub use error::{ExecutionError, ExecutionFailure};
pub use executor::{CodeExecutor, ExecutionResult};
pub use policy::{ExecutionLimits, ExecutionPolicy, Toolchain};
pub use workspace::{WORKSPACE_PREFIX, Workspace};
