//! Task supervisor: owns every detached unit of work the process starts.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use linkshare_core::config::WorkerConfig;
use linkshare_core::result::AppResult;

use crate::retry::RetryPolicy;

#[derive(Debug)]
struct Inner {
    tracker: TaskTracker,
    semaphore: Arc<Semaphore>,
    pending: AtomicUsize,
    max_pending: usize,
    shutdown: CancellationToken,
}

/// Decrements the pending count when a task finishes or is dropped.
struct PendingGuard(Arc<Inner>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bounded pool for background tasks.
///
/// At most `concurrency` tasks run at once and at most `max_pending` may be
/// submitted but unfinished; anything beyond that is dropped with a warning.
/// [`TaskSupervisor::shutdown`] stops intake, waits for in-flight work up to
/// a deadline and then cancels what is left.
#[derive(Debug, Clone)]
pub struct TaskSupervisor {
    inner: Arc<Inner>,
}

impl TaskSupervisor {
    /// Create a supervisor from configuration.
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                tracker: TaskTracker::new(),
                semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
                pending: AtomicUsize::new(0),
                max_pending: config.max_pending.max(1),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Number of submitted tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Whether intake has stopped.
    pub fn is_closed(&self) -> bool {
        self.inner.tracker.is_closed()
    }

    /// Run `task` in the background. Returns `false` if it was refused.
    pub fn submit<F>(&self, name: &'static str, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.inner.tracker.is_closed() {
            warn!(task = name, "Supervisor is shutting down, task refused");
            return false;
        }

        let previous = self.inner.pending.fetch_add(1, Ordering::SeqCst);
        if previous >= self.inner.max_pending {
            self.inner.pending.fetch_sub(1, Ordering::SeqCst);
            warn!(
                task = name,
                max_pending = self.inner.max_pending,
                "Background backlog full, task dropped"
            );
            return false;
        }

        let guard = PendingGuard(Arc::clone(&self.inner));
        let semaphore = Arc::clone(&self.inner.semaphore);
        let shutdown = self.inner.shutdown.clone();

        self.inner.tracker.spawn(async move {
            let _guard = guard;

            let permit = tokio::select! {
                permit = semaphore.acquire_owned() => permit,
                () = shutdown.cancelled() => {
                    debug!(task = name, "Task cancelled before it started");
                    return;
                }
            };
            let Ok(_permit) = permit else {
                return;
            };

            tokio::select! {
                biased;
                () = task => {}
                () = shutdown.cancelled() => {
                    warn!(task = name, "Task cancelled at shutdown");
                }
            }
        });
        true
    }

    /// Run `op` in the background, retrying failures under `policy`.
    ///
    /// Exhausted retries are logged at `warn` and otherwise dropped.
    pub fn submit_retrying<Op, Fut>(&self, name: &'static str, policy: RetryPolicy, mut op: Op) -> bool
    where
        Op: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let shutdown = self.inner.shutdown.clone();

        self.submit(name, async move {
            let attempts = policy.attempts();
            for attempt in 1..=attempts {
                let delay = policy.delay_before(attempt);
                if !delay.is_zero() {
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = shutdown.cancelled() => return,
                    }
                }

                match op().await {
                    Ok(()) => {
                        debug!(task = name, attempt, "Background task succeeded");
                        return;
                    }
                    Err(e) if attempt < attempts => {
                        debug!(task = name, attempt, error = %e, "Background task failed, will retry");
                    }
                    Err(e) => {
                        warn!(
                            task = name,
                            attempts,
                            error = %e,
                            call_site = e.call_site().as_deref().unwrap_or("-"),
                            "Background task retries exhausted"
                        );
                    }
                }
            }
        })
    }

    /// Stop intake and wait for in-flight tasks.
    ///
    /// Returns `true` if everything finished within `drain_timeout`; tasks
    /// still running afterwards are cancelled.
    pub async fn shutdown(&self, drain_timeout: Duration) -> bool {
        self.inner.tracker.close();
        info!(
            pending = self.pending(),
            timeout_ms = u64::try_from(drain_timeout.as_millis()).unwrap_or(u64::MAX),
            "Draining background tasks"
        );

        let drained = tokio::time::timeout(drain_timeout, self.inner.tracker.wait())
            .await
            .is_ok();

        self.inner.shutdown.cancel();
        if drained {
            info!("Background tasks drained");
        } else {
            warn!(
                pending = self.pending(),
                "Drain deadline passed, cancelling remaining tasks"
            );
            self.inner.tracker.wait().await;
        }
        drained
    }
}
