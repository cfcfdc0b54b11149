//! Request and response bodies of the JSON API

use golearn_core::ExecutionResult;
use serde::{Deserialize, Serialize};

/// Uniform error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `POST /api/run`
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub code: String,
}

/// Result of a code run.
///
/// `error` is absent when the program exited cleanly. `status` carries the
/// machine-readable classification (`"timeout"` or `"failed"`) alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResponse {
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl RunResponse {
    /// A run that never started
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            error: Some(message.into()),
            status: None,
            truncated: false,
        }
    }
}

impl From<ExecutionResult> for RunResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            error: result.error_message(),
            status: result.failure.map(|f| f.kind().to_string()),
            truncated: result.truncated,
            output: result.output,
        }
    }
}

/// `POST /api/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub progress: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub progress: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
