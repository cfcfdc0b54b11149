//! Execution policy — which toolchain runs submitted code and under what limits

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Limits applied to a single execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionLimits {
    pub timeout_secs: u64,
    pub max_output_bytes: usize,
    /// Reject submissions longer than this; unlimited when unset
    pub max_code_bytes: Option<usize>,
    /// How long to keep draining pipes after the child has been reaped
    pub drain_grace_ms: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_output_bytes: 1024 * 1024, // 1MB
            max_code_bytes: None,
            drain_grace_ms: 500,
        }
    }
}

impl ExecutionLimits {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}

/// The external compile-and-run entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Toolchain {
    pub program: String,
    /// Arguments placed before the source file path
    pub args: Vec<String>,
    /// Name of the single source file written into each workspace
    pub source_file: String,
    /// Environment variables set to the workspace path for each run, so
    /// scratch files the toolchain leaves behind are removed with it
    pub workspace_env: Vec<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            args: vec!["run".to_string()],
            source_file: "main.go".to_string(),
            workspace_env: vec!["GOTMPDIR".to_string()],
        }
    }
}

/// Execution policy — toolchain, limits, and where workspaces live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionPolicy {
    pub toolchain: Toolchain,
    pub limits: ExecutionLimits,
    /// Parent directory for per-run workspaces; the system temp dir when unset
    pub workspace_root: Option<PathBuf>,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            toolchain: Toolchain::default(),
            limits: ExecutionLimits::default(),
            workspace_root: None,
        }
    }
}

impl ExecutionPolicy {
    /// Directory new workspaces are created under
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Check the submitted code against the size limit
    pub fn is_code_size_allowed(&self, code: &str) -> bool {
        self.limits
            .max_code_bytes
            .is_none_or(|limit| code.len() <= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_limits_default() {
        let limits = ExecutionLimits::default();
        assert_eq!(limits.timeout_secs, 5);
        assert_eq!(limits.timeout(), Duration::from_secs(5));
        assert_eq!(limits.max_output_bytes, 1024 * 1024);
        assert_eq!(limits.drain_grace(), Duration::from_millis(500));
    }

    #[test]
    fn test_toolchain_default_is_go_run() {
        let toolchain = Toolchain::default();
        assert_eq!(toolchain.program, "go");
        assert_eq!(toolchain.args, vec!["run"]);
        assert_eq!(toolchain.source_file, "main.go");
        assert_eq!(toolchain.workspace_env, vec!["GOTMPDIR"]);
    }

    #[test]
    fn test_workspace_root_falls_back_to_temp_dir() {
        let policy = ExecutionPolicy::default();
        assert_eq!(policy.workspace_root(), std::env::temp_dir());

        let policy = ExecutionPolicy {
            workspace_root: Some(PathBuf::from("/srv/golearn/runs")),
            ..Default::default()
        };
        assert_eq!(policy.workspace_root(), PathBuf::from("/srv/golearn/runs"));
    }

    #[test]
    fn test_code_size_limit() {
        let mut policy = ExecutionPolicy::default();
        assert!(policy.is_code_size_allowed(&"x".repeat(200_000)));

        policy.limits.max_code_bytes = Some(100_000);
        assert!(policy.is_code_size_allowed("package main"));
        assert!(policy.is_code_size_allowed(&"x".repeat(100_000)));
        assert!(!policy.is_code_size_allowed(&"x".repeat(100_001)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let policy: ExecutionPolicy = toml::from_str(
            r#"
            [limits]
            timeout_secs = 2

            [toolchain]
            program = "/usr/local/go/bin/go"
            "#,
        )
        .unwrap();
        assert_eq!(policy.limits.timeout_secs, 2);
        assert_eq!(policy.limits.max_code_bytes, None);
        assert_eq!(policy.toolchain.workspace_env, vec!["GOTMPDIR"]);
        assert_eq!(policy.toolchain.program, "/usr/local/go/bin/go");
        assert_eq!(policy.toolchain.source_file, "main.go");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ExecutionPolicy, _> = toml::from_str("memory_mb = 256");
        assert!(result.is_err());
    }
}
