//! golearn-progress — which lessons each user has completed
//!
//! [`ProgressStore`] is the seam the HTTP layer talks to;
//! [`SqliteProgressStore`] is the implementation used in deployments.

pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

pub use sqlite::SqliteProgressStore;

/// Persistent per-user completion records.
///
/// Usernames are expected to be trimmed and non-empty; callers validate.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Create the user if missing. Returns true when a new row was created.
    async fn ensure_user(&self, username: &str) -> Result<bool>;

    /// Completed lesson IDs in completion order; empty when there are none
    async fn get_progress(&self, username: &str) -> Result<Vec<String>>;

    /// Record a completion. Marking the same lesson again is a no-op.
    async fn mark_completed(&self, username: &str, lesson_id: &str) -> Result<()>;

    /// Remove every completion for the user
    async fn reset_progress(&self, username: &str) -> Result<()>;
}
