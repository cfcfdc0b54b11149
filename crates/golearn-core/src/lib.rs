//! golearn-core — lesson catalog, sandboxed code runner, and configuration
//!
//! The catalog is built once from content compiled into the crate. The
//! sandbox runs submitted Go snippets with `go run` in throwaway workspaces
//! under a wall-clock deadline.

pub mod catalog;
pub mod config;
pub mod doctor;
pub mod sandbox;

pub use catalog::{Catalog, Chapter, Lesson, LessonSummary, Quiz};
pub use config::GolearnConfig;
pub use doctor::{CheckResult, CheckStatus, DoctorReport, run_doctor};
pub use sandbox::{CodeExecutor, ExecutionError, ExecutionFailure, ExecutionPolicy, ExecutionResult};
