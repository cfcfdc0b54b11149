//! Code executor — run submitted source through the toolchain under a deadline

use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::error::{ExecutionError, ExecutionFailure};
use super::policy::ExecutionPolicy;
use super::process::{OutputBuffer, ProcessGroupGuard, finish_drains};
use super::workspace::Workspace;

/// Result of a run that got as far as launching (or trying to launch) the toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Combined stdout and stderr, kept even when the run timed out or failed
    pub output: String,
    pub failure: Option<ExecutionFailure>,
    pub exit_code: Option<i32>,
    /// Output went past `max_output_bytes` and the rest was discarded
    pub truncated: bool,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_timeout(&self) -> bool {
        self.failure.is_some_and(|f| f.is_timeout())
    }

    /// Human-readable error for the client, if any
    pub fn error_message(&self) -> Option<String> {
        self.failure.map(|f| f.to_string())
    }
}

/// Runs untrusted snippets, one disposable workspace per call.
///
/// Holds no mutable state; clone it freely and call `execute` concurrently.
#[derive(Debug, Clone, Default)]
pub struct CodeExecutor {
    policy: ExecutionPolicy,
}

impl CodeExecutor {
    pub fn new(policy: ExecutionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    /// Check whether the configured toolchain answers `<program> version`
    pub async fn toolchain_available(&self) -> bool {
        Command::new(&self.policy.toolchain.program)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Execute `code` in a fresh workspace.
    ///
    /// Empty or oversized code is rejected before anything touches the
    /// filesystem. Once a workspace exists it is removed before this
    /// returns, whatever the outcome.
    pub async fn execute(&self, code: &str) -> Result<ExecutionResult, ExecutionError> {
        if code.trim().is_empty() {
            return Err(ExecutionError::EmptyCode);
        }
        if let Some(limit) = self.policy.limits.max_code_bytes
            && !self.policy.is_code_size_allowed(code)
        {
            return Err(ExecutionError::CodeTooLarge {
                size: code.len(),
                limit,
            });
        }

        let mut workspace = Workspace::create(&self.policy.workspace_root())
            .map_err(ExecutionError::Workspace)?;

        debug!(
            "Sandbox: run {} executing {} bytes in {}",
            workspace.run_id(),
            code.len(),
            workspace.path().display()
        );

        let result = self.run_in(&workspace, code).await;
        workspace.cleanup();
        result
    }

    async fn run_in(
        &self,
        workspace: &Workspace,
        code: &str,
    ) -> Result<ExecutionResult, ExecutionError> {
        let toolchain = &self.policy.toolchain;
        let limits = &self.policy.limits;
        let run_id = workspace.run_id();

        let source = workspace
            .write_source(&toolchain.source_file, code)
            .await
            .map_err(ExecutionError::Workspace)?;

        let mut command = Command::new(&toolchain.program);
        command
            .args(&toolchain.args)
            .arg(&source)
            .current_dir(workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for key in &toolchain.workspace_env {
            command.env(key, workspace.path());
        }
        #[cfg(unix)]
        command.process_group(0);

        let start = Instant::now();
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    "Sandbox: run {} could not start '{}': {}",
                    run_id, toolchain.program, e
                );
                return Ok(ExecutionResult {
                    output: format!("failed to start {}: {}\n", toolchain.program, e),
                    failure: Some(ExecutionFailure::Failed),
                    exit_code: None,
                    truncated: false,
                    duration_ms: start.elapsed().as_millis() as u64,
                });
            }
        };

        let mut group = ProcessGroupGuard::new(child.id());
        let buffer = OutputBuffer::new(limits.max_output_bytes);
        let mut drains = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            drains.push(buffer.drain(stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            drains.push(buffer.drain(stderr));
        }

        let (exit_code, failure) = match tokio::time::timeout(limits.timeout(), child.wait()).await
        {
            Ok(Ok(status)) => (
                status.code(),
                (!status.success()).then_some(ExecutionFailure::Failed),
            ),
            Ok(Err(e)) => {
                warn!("Sandbox: run {} wait failed: {}", run_id, e);
                group.kill();
                let _ = child.start_kill();
                (None, Some(ExecutionFailure::Failed))
            }
            Err(_) => {
                warn!(
                    "Sandbox: run {} exceeded {}s, killing process group",
                    run_id, limits.timeout_secs
                );
                group.kill();
                let _ = child.start_kill();
                // SIGKILL is not ignorable; this only bounds the reap.
                if tokio::time::timeout(limits.drain_grace(), child.wait())
                    .await
                    .is_err()
                {
                    warn!("Sandbox: run {} not reaped after SIGKILL", run_id);
                }
                (
                    None,
                    Some(ExecutionFailure::Timeout {
                        limit_secs: limits.timeout_secs,
                    }),
                )
            }
        };

        group.release();
        finish_drains(drains, limits.drain_grace()).await;

        let (output, truncated) = buffer.snapshot();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Sandbox: run {} finished ({}, exit={:?}, {}ms, {} bytes{})",
            run_id,
            failure.map(|f| f.kind()).unwrap_or("ok"),
            exit_code,
            duration_ms,
            output.len(),
            if truncated { ", truncated" } else { "" }
        );

        Ok(ExecutionResult {
            output,
            failure,
            exit_code,
            truncated,
            duration_ms,
        })
    }
}
