//! Child process plumbing — combined output capture and process-group teardown

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Shared sink for stdout and stderr, appended in arrival order and capped
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    inner: Arc<Mutex<Captured>>,
    limit: usize,
}

impl OutputBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Captured::default())),
            limit,
        }
    }

    fn append(&self, chunk: &[u8]) {
        let mut captured = self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Output buffer mutex was poisoned, recovering");
            poisoned.into_inner()
        });
        let room = self.limit.saturating_sub(captured.bytes.len());
        if chunk.len() > room {
            captured.truncated = true;
        }
        let take = chunk.len().min(room);
        captured.bytes.extend_from_slice(&chunk[..take]);
    }

    /// Read `reader` to EOF on a background task, appending into this buffer.
    ///
    /// Reading continues past the cap (discarding bytes) so a chatty child
    /// never blocks on a full pipe.
    pub fn drain<R>(&self, mut reader: R) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = self.clone();
        tokio::spawn(async move {
            let mut chunk = vec![0u8; READ_CHUNK];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => buffer.append(&chunk[..n]),
                    Err(e) => {
                        debug!("Output pipe read failed: {}", e);
                        break;
                    }
                }
            }
        })
    }

    /// Captured text (lossy UTF-8) and whether the cap was hit
    pub fn snapshot(&self) -> (String, bool) {
        let captured = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (
            String::from_utf8_lossy(&captured.bytes).into_owned(),
            captured.truncated,
        )
    }
}

/// Wait for the drain tasks, giving up after `grace`.
///
/// A grandchild that inherited the pipes can keep them open after the
/// direct child is gone; such readers are aborted rather than awaited.
pub async fn finish_drains(drains: Vec<JoinHandle<()>>, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;
    for mut handle in drains {
        if tokio::time::timeout_at(deadline, &mut handle).await.is_err() {
            warn!("Output pipe still open after {:?}, abandoning reader", grace);
            handle.abort();
        }
    }
}

/// Kills the child's whole process group when told to, and again on drop.
///
/// The child is spawned as the leader of a fresh group, so the toolchain
/// and everything it forks (the compiled program, shells, sleeps) share
/// one pgid.
pub struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    pub fn new(leader_pid: Option<u32>) -> Self {
        Self { pgid: leader_pid }
    }

    /// Send SIGKILL to every process in the group. Safe to call repeatedly.
    pub fn kill(&self) {
        if let Some(pgid) = self.pgid {
            kill_group(pgid);
        }
    }

    /// Kill any stragglers one last time and stop tracking the group
    pub fn release(&mut self) {
        self.kill();
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!("Sent SIGKILL to process group {}", pgid),
        // Group already gone
        Err(Errno::ESRCH) => {}
        Err(e) => warn!("Failed to kill process group {}: {}", pgid, e),
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}
