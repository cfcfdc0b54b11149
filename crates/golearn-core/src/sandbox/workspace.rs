//! Run-scoped workspaces — one disposable directory per execution
//!
//! A [`Workspace`] owns its directory for exactly one run. The directory is
//! removed by [`Workspace::cleanup`] or, failing that, when the guard is
//! dropped, so every exit path (error, timeout, panic, cancelled future)
//! leaves nothing behind.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Prefix of every workspace directory name
pub const WORKSPACE_PREFIX: &str = "golearn-run-";

pub struct Workspace {
    run_id: String,
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workspace {
    /// Create a uniquely named workspace directory under `root`
    pub fn create(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("Failed to create workspace root {}", root.display()))?;

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)
            .with_context(|| format!("Failed to create workspace under {}", root.display()))?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let path = dir.path().to_path_buf();
        debug!("Workspace {} created at {}", run_id, path.display());

        Ok(Self {
            run_id,
            path,
            dir: Some(dir),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the single source file of this run and return its path
    pub async fn write_source(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        if self.dir.is_none() {
            bail!("Workspace {} has already been cleaned up", self.run_id);
        }
        if Path::new(file_name).file_name().and_then(|n| n.to_str()) != Some(file_name) {
            bail!("Invalid source file name '{}'", file_name);
        }

        let source_path = self.path.join(file_name);
        tokio::fs::write(&source_path, content)
            .await
            .with_context(|| format!("Failed to write source file {}", source_path.display()))?;
        Ok(source_path)
    }

    /// Remove the workspace and everything in it (idempotent)
    pub fn cleanup(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => debug!("Workspace {} removed", self.run_id),
            Err(e) => warn!(
                "Failed to remove workspace {} at {}: {}",
                self.run_id,
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_workspace_lifecycle() {
        let root = tempfile::tempdir().unwrap();
        let mut workspace = Workspace::create(root.path()).unwrap();
        assert!(workspace.path().is_dir());
        assert!(workspace.path().starts_with(root.path()));

        let name = workspace.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(WORKSPACE_PREFIX));

        let source = workspace.write_source("main.go", "package main").await.unwrap();
        assert_eq!(std::fs::read_to_string(&source).unwrap(), "package main");

        let path = workspace.path().to_path_buf();
        workspace.cleanup();
        assert!(!path.exists());

        // Second cleanup is a no-op
        workspace.cleanup();
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let workspace = Workspace::create(root.path()).unwrap();
            std::fs::write(workspace.path().join("extra.txt"), "left behind?").unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_workspaces_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::create(root.path()).unwrap();
        let b = Workspace::create(root.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert_ne!(a.run_id(), b.run_id());
    }

    #[tokio::test]
    async fn test_write_source_rejects_paths() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(root.path()).unwrap();
        assert!(workspace.write_source("../escape.go", "x").await.is_err());
        assert!(workspace.write_source("sub/main.go", "x").await.is_err());
        assert!(workspace.write_source("", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_write_after_cleanup_fails() {
        let root = tempfile::tempdir().unwrap();
        let mut workspace = Workspace::create(root.path()).unwrap();
        workspace.cleanup();
        assert!(workspace.write_source("main.go", "x").await.is_err());
    }

    #[test]
    fn test_create_makes_missing_root() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("nested").join("runs");
        let workspace = Workspace::create(&root).unwrap();
        assert!(workspace.path().starts_with(&root));
    }
}
