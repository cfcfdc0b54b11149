//! SQLite-backed progress store

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::ProgressStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS progress (
    username TEXT NOT NULL,
    lesson_id TEXT NOT NULL,
    completed_at TEXT NOT NULL,
    PRIMARY KEY (username, lesson_id),
    FOREIGN KEY (username) REFERENCES users(username)
);
";

/// SQLite database wrapper (thread-safe via Arc<Mutex>)
#[derive(Clone)]
pub struct SqliteProgressStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProgressStore {
    /// Open (or create) the database file and apply the schema
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).with_context(|| {
            format!("Failed to open SQLite database {}", path.as_ref().display())
        })?;

        info!("Initializing progress database at {:?}", path.as_ref());
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to enable WAL mode")?;
        Self::init(conn)
    }

    /// Private in-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to create progress schema")?;

        debug!("Database schema initialized successfully");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|poisoned| {
        warn!("Database mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Fixed-width timestamp so `ORDER BY completed_at` sorts chronologically
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn insert_user(conn: &Connection, username: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT OR IGNORE INTO users (username, created_at) VALUES (?1, ?2)",
        params![username, now()],
    )
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn ensure_user(&self, username: &str) -> Result<bool> {
        let conn = Arc::clone(&self.conn);
        let username = username.to_owned();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn);
            let created = insert_user(&conn, &username).context("Failed to create user")? > 0;
            if created {
                info!("Created user {}", username);
            }
            Ok(created)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    async fn get_progress(&self, username: &str) -> Result<Vec<String>> {
        let conn = Arc::clone(&self.conn);
        let username = username.to_owned();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn);
            let mut stmt = conn.prepare(
                "SELECT lesson_id FROM progress
                 WHERE username = ?1
                 ORDER BY completed_at, rowid",
            )?;
            let lessons = stmt
                .query_map(params![&username], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read progress")?;
            Ok(lessons)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    async fn mark_completed(&self, username: &str, lesson_id: &str) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let username = username.to_owned();
        let lesson_id = lesson_id.to_owned();

        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn);
            let tx = conn.transaction()?;
            // The user may never have logged in; keep the foreign key satisfied
            insert_user(&tx, &username)?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO progress (username, lesson_id, completed_at)
                 VALUES (?1, ?2, ?3)",
                params![&username, &lesson_id, now()],
            )?;
            tx.commit().context("Failed to save progress")?;

            debug!(
                "Marked {} completed for {} (new: {})",
                lesson_id,
                username,
                inserted > 0
            );
            Ok(())
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    async fn reset_progress(&self, username: &str) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let username = username.to_owned();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn);
            let deleted = conn
                .execute("DELETE FROM progress WHERE username = ?1", params![&username])
                .context("Failed to reset progress")?;
            info!("Reset progress for {} ({} lessons)", username, deleted);
            Ok(())
        })
        .await
        .context("spawn_blocking task panicked")?
    }
}
