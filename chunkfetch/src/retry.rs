//! Retry scheduling off the caller's thread.
//!
//! Retried fetches are never re-entered inline: the attempt is handed to a
//! shared executor that waits out the backoff interval and then re-dispatches
//! the fetch on a worker thread. This keeps transport I/O threads free of
//! sleeps and avoids unbounded call-stack growth from recursive retries.
//!
//! [`RetrySchedule`] is the seam the client depends on; [`RetryExecutor`] is
//! the production implementation, a process-wide tokio runtime whose timer
//! paces the backoff and whose blocking pool (growable, shared across all
//! clients) runs the re-dispatch.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

/// Deferred execution of retry jobs.
pub trait RetrySchedule: Send + Sync {
    /// Run `job` after `delay` has elapsed, on a worker thread.
    ///
    /// The wait must not be cut short: a job scheduled with a delay runs no
    /// earlier than that delay. Jobs may block (stream re-opening performs
    /// network I/O).
    fn schedule(&self, delay: Duration, job: Box<dyn FnOnce() + Send + 'static>);
}

/// Shared retry executor backed by a small tokio runtime.
pub struct RetryExecutor {
    runtime: Runtime,
}

impl RetryExecutor {
    /// Create a dedicated executor. Most callers want [`RetryExecutor::shared`].
    pub fn new() -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("chunk-fetch-retry")
            .enable_time()
            .build()?;
        Ok(Self { runtime })
    }

    /// The process-wide executor shared by all clients.
    ///
    /// Created lazily on first use and never torn down; abandoned clients
    /// simply let their scheduled retries run out with no observers.
    pub fn shared() -> Arc<RetryExecutor> {
        static SHARED: OnceLock<Arc<RetryExecutor>> = OnceLock::new();
        SHARED
            .get_or_init(|| {
                Arc::new(RetryExecutor::new().expect("Failed to create retry runtime"))
            })
            .clone()
    }
}

impl RetrySchedule for RetryExecutor {
    fn schedule(&self, delay: Duration, job: Box<dyn FnOnce() + Send + 'static>) {
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Blocking pool: the job may stall on stream re-opening.
            tokio::task::spawn_blocking(job);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Instant;

    #[test]
    fn test_schedule_runs_job_after_delay() {
        let executor = RetryExecutor::new().unwrap();
        let (tx, rx) = mpsc::channel();

        let start = Instant::now();
        executor.schedule(
            Duration::from_millis(30),
            Box::new(move || {
                tx.send(start.elapsed()).unwrap();
            }),
        );

        let elapsed = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("job should run");
        assert!(elapsed >= Duration::from_millis(30));
    }

    #[test]
    fn test_schedule_runs_job_off_caller_thread() {
        let executor = RetryExecutor::new().unwrap();
        let (tx, rx) = mpsc::channel();

        executor.schedule(
            Duration::from_millis(1),
            Box::new(move || {
                tx.send(std::thread::current().id()).unwrap();
            }),
        );

        let worker = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("job should run");
        assert_ne!(worker, std::thread::current().id());
    }

    #[test]
    fn test_shared_returns_same_executor() {
        let a = RetryExecutor::shared();
        let b = RetryExecutor::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
