//! Doctor — health checks for a golearn installation
//!
//! Checks the config file, the progress database location, the Go toolchain,
//! the workspace root, and the built-in lesson content.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::GolearnConfig;
use crate::sandbox::CodeExecutor;

/// Result of a single health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub fix_hint: Option<String>,
}

/// Status of a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Warn => write!(f, "WARN"),
            CheckStatus::Fail => write!(f, "FAIL"),
            CheckStatus::Skip => write!(f, "SKIP"),
        }
    }
}

/// Full doctor report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub pass_count: usize,
    pub warn_count: usize,
    pub fail_count: usize,
    pub skip_count: usize,
}

impl DoctorReport {
    pub fn is_healthy(&self) -> bool {
        self.fail_count == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} warnings, {} failed, {} skipped",
            self.pass_count, self.warn_count, self.fail_count, self.skip_count
        )
    }
}

/// Run all doctor checks
pub async fn run_doctor(config: &GolearnConfig, config_path: Option<&Path>) -> Result<DoctorReport> {
    info!("Running doctor checks...");
    let mut checks = Vec::new();

    // 1. Config file exists
    checks.push(check_config_file(config_path));

    // 2. Database directory writable
    let db_path = config
        .storage
        .enabled
        .then_some(config.storage.db_path.as_path());
    checks.push(check_db_path(db_path));

    // 3. Toolchain answers `<program> version`
    checks.push(check_toolchain(&CodeExecutor::new(config.sandbox.clone())).await);

    // 4. Workspace root writable
    checks.push(check_workspace_root(&config.sandbox.workspace_root()));

    // 5. Built-in content parses and validates
    checks.push(check_catalog());

    let report = DoctorReport::from_checks(checks);

    if report.is_healthy() {
        info!("Doctor: all checks passed ({})", report.summary());
    } else {
        warn!("Doctor: issues found ({})", report.summary());
    }

    Ok(report)
}

impl DoctorReport {
    pub fn from_checks(checks: Vec<CheckResult>) -> Self {
        let count = |status| checks.iter().filter(|c| c.status == status).count();
        let pass_count = count(CheckStatus::Pass);
        let warn_count = count(CheckStatus::Warn);
        let fail_count = count(CheckStatus::Fail);
        let skip_count = count(CheckStatus::Skip);
        Self {
            checks,
            pass_count,
            warn_count,
            fail_count,
            skip_count,
        }
    }
}

fn check_config_file(path: Option<&Path>) -> CheckResult {
    match path {
        Some(p) => {
            if p.exists() {
                CheckResult {
                    name: "config_file".to_string(),
                    status: CheckStatus::Pass,
                    message: format!("Config file found: {}", p.display()),
                    fix_hint: None,
                }
            } else {
                CheckResult {
                    name: "config_file".to_string(),
                    status: CheckStatus::Fail,
                    message: format!("Config file not found: {}", p.display()),
                    fix_hint: Some("Remove --config to run with built-in defaults".to_string()),
                }
            }
        }
        None => CheckResult {
            name: "config_file".to_string(),
            status: CheckStatus::Skip,
            message: "No config file, using defaults".to_string(),
            fix_hint: None,
        },
    }
}

fn check_db_path(path: Option<&Path>) -> CheckResult {
    match path {
        Some(p) => {
            let dir = match p.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            if dir.exists() {
                CheckResult {
                    name: "database_dir".to_string(),
                    status: CheckStatus::Pass,
                    message: format!("Database directory exists: {}", dir.display()),
                    fix_hint: None,
                }
            } else {
                // Try to create it
                match std::fs::create_dir_all(dir) {
                    Ok(_) => CheckResult {
                        name: "database_dir".to_string(),
                        status: CheckStatus::Pass,
                        message: format!("Created database directory: {}", dir.display()),
                        fix_hint: None,
                    },
                    Err(e) => CheckResult {
                        name: "database_dir".to_string(),
                        status: CheckStatus::Fail,
                        message: format!("Cannot create database directory: {}", e),
                        fix_hint: Some(format!("mkdir -p {}", dir.display())),
                    },
                }
            }
        }
        None => CheckResult {
            name: "database_dir".to_string(),
            status: CheckStatus::Skip,
            message: "Progress storage disabled".to_string(),
            fix_hint: None,
        },
    }
}

async fn check_toolchain(executor: &CodeExecutor) -> CheckResult {
    let program = &executor.policy().toolchain.program;
    if executor.toolchain_available().await {
        CheckResult {
            name: "toolchain".to_string(),
            status: CheckStatus::Pass,
            message: format!("`{} version` succeeded", program),
            fix_hint: None,
        }
    } else {
        CheckResult {
            name: "toolchain".to_string(),
            status: CheckStatus::Fail,
            message: format!("`{}` is not available; code runs will fail", program),
            fix_hint: Some("Install Go: https://go.dev/doc/install".to_string()),
        }
    }
}

fn check_workspace_root(root: &Path) -> CheckResult {
    // The executor creates the root on first use; do the same here
    let scratch = root.join(format!(".golearn_doctor_{}", std::process::id()));
    let writable = std::fs::create_dir_all(root).and_then(|_| std::fs::write(&scratch, "test"));

    match writable {
        Ok(_) => {
            let _ = std::fs::remove_file(&scratch);
            CheckResult {
                name: "workspace_root".to_string(),
                status: CheckStatus::Pass,
                message: format!("Workspace root writable: {}", root.display()),
                fix_hint: None,
            }
        }
        Err(e) => CheckResult {
            name: "workspace_root".to_string(),
            status: CheckStatus::Fail,
            message: format!("Workspace root not writable: {}", e),
            fix_hint: Some("Set [sandbox] workspace_root to a writable directory".to_string()),
        },
    }
}

fn check_catalog() -> CheckResult {
    match Catalog::builtin() {
        Ok(catalog) => {
            debug!("Catalog check: {} lessons", catalog.lesson_count());
            CheckResult {
                name: "catalog".to_string(),
                status: CheckStatus::Pass,
                message: format!(
                    "{} chapters, {} lessons, {} quizzes",
                    catalog.list_chapters().len(),
                    catalog.lesson_count(),
                    catalog.quiz_count()
                ),
                fix_hint: None,
            }
        }
        Err(e) => CheckResult {
            name: "catalog".to_string(),
            status: CheckStatus::Fail,
            message: format!("Built-in content is invalid: {:#}", e),
            fix_hint: None,
        },
    }
}
