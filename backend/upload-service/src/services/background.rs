/// Detached background work (search indexing, transcoding)
///
/// Tasks are fire-and-forget from the request's point of view: nothing joins
/// them back and there is no cancellation. Every failure or panic ends up as
/// a log record tagged with the task kind and asset id; none of them can
/// take the process down.
///
/// Only work launched through [`BackgroundTasks::spawn_limited`] counts
/// against the configured limit; everything else starts immediately. With no
/// limit, each upload spawns its own transcode, so a burst of uploads runs
/// that many ffmpeg processes at once.
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

#[derive(Clone)]
pub struct BackgroundTasks {
    runtime: Handle,
    tracker: TaskTracker,
    limiter: Option<Arc<Semaphore>>,
    idle_waiters: Arc<Mutex<()>>,
}

impl BackgroundTasks {
    /// `runtime` outlives the HTTP workers, so detached work keeps running
    /// while the server drains.
    pub fn new(runtime: Handle, max_concurrent: Option<usize>) -> Self {
        Self {
            runtime,
            tracker: TaskTracker::new(),
            limiter: max_concurrent.map(|n| Arc::new(Semaphore::new(n))),
            idle_waiters: Arc::new(Mutex::new(())),
        }
    }

    /// Spawn onto the current runtime with no concurrency limit
    pub fn current() -> Self {
        Self::new(Handle::current(), None)
    }

    /// Launch `task` without waiting for it. Never queued behind the limit.
    pub fn spawn<F, E>(&self, kind: &'static str, asset_id: String, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.launch(kind, asset_id, task, None);
    }

    /// Launch `task` once a slot under the configured limit is free
    pub fn spawn_limited<F, E>(&self, kind: &'static str, asset_id: String, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.launch(kind, asset_id, task, self.limiter.clone());
    }

    fn launch<F, E>(
        &self,
        kind: &'static str,
        asset_id: String,
        task: F,
        limiter: Option<Arc<Semaphore>>,
    ) where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let runtime = self.runtime.clone();

        self.tracker.spawn_on(
            async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                // Inner task so a panic is observed here instead of unwinding
                // through the tracker
                match runtime.spawn(task).await {
                    Ok(Ok(())) => debug!(task = kind, asset_id = %asset_id, "Background task finished"),
                    Ok(Err(err)) => {
                        error!(task = kind, asset_id = %asset_id, error = %err, "Background task failed")
                    }
                    Err(join_err) if join_err.is_panic() => {
                        error!(task = kind, asset_id = %asset_id, "Background task panicked")
                    }
                    Err(join_err) => {
                        warn!(task = kind, asset_id = %asset_id, "Background task aborted: {}", join_err)
                    }
                }
            },
            &self.runtime,
        );
    }

    /// Number of launched tasks that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every task launched so far has finished.
    ///
    /// Waiters are serialized: the tracker is closed for the wait and reopened
    /// afterwards, so two overlapping waits must not interleave.
    pub async fn wait_idle(&self) {
        let _turn = self.idle_waiters.lock().await;
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
