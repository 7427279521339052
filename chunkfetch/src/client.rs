//! Retrying chunk-read client.
//!
//! [`ChunkClient`] wraps one partition location so that callers reading its
//! chunks never have to reason about connection churn or which physical copy
//! served a given chunk. A session is `open_chunks()` (blocking, retried
//! internally, returns the chunk count) followed by any number of
//! `fetch_chunk()` calls (fire-and-forget, resolved later through the
//! caller's callback).
//!
//! Up to `max_tries` attempts are allowed per cycle, where each attempt
//! reaches whichever copy the replica currently binds - a retry is in effect
//! a chance for the replica to switch between master and slave and re-open
//! the stream. The location reported back to the caller is always the one
//! bound at construction, so failover stays invisible upstream.
//!
//! # Concurrency
//!
//! The attempt counter, fault-injection check, and attempt snapshot share one
//! per-client lock; stream acquisition and chunk dispatch happen outside it.
//! Completions arrive on arbitrary transport threads and retries are
//! re-dispatched from the shared retry executor, so the counter is only ever
//! advanced with a max-update - a stale completion from an earlier attempt
//! can never push it backward past a more advanced one.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::fault::{ChunkIndexFaultInjector, FetchFaultInjector};
use crate::location::PartitionLocation;
use crate::replica::Replica;
use crate::retry::{RetryExecutor, RetrySchedule};
use crate::transport::ChunkReceivedCallback;

/// Client for reading the chunks of one partition location.
///
/// Cheap to clone; clones share the same session state. Construct once per
/// logical partition-read session.
#[derive(Clone)]
pub struct ChunkClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    location: PartitionLocation,
    replica: Arc<dyn Replica>,
    callback: Arc<dyn ChunkReceivedCallback>,
    scheduler: Arc<dyn RetrySchedule>,
    injector: Option<Arc<dyn FetchFaultInjector>>,
    max_tries: u32,
    retry_wait: Duration,
    /// Attempts consumed in the current cycle. Guarded together with
    /// decorator creation and the injection check.
    num_tries: Mutex<u32>,
    /// Open is a single blocking call by contract; this is the safety net.
    open_lock: Mutex<()>,
}

impl ChunkClient {
    /// Create a client bound to `location`, using the shared retry executor.
    ///
    /// Fault injection is armed from
    /// [`test_fetch_failure_index`](ClientConfig::test_fetch_failure_index)
    /// when set.
    pub fn new(
        config: &ClientConfig,
        location: PartitionLocation,
        replica: Arc<dyn Replica>,
        callback: Arc<dyn ChunkReceivedCallback>,
    ) -> Self {
        let injector = config
            .test_fetch_failure_index
            .map(|index| Arc::new(ChunkIndexFaultInjector::new(index)) as Arc<dyn FetchFaultInjector>);
        Self::with_hooks(
            config,
            location,
            replica,
            callback,
            RetryExecutor::shared(),
            injector,
        )
    }

    /// Create a client with an explicit retry scheduler and fault injector.
    pub fn with_hooks(
        config: &ClientConfig,
        location: PartitionLocation,
        replica: Arc<dyn Replica>,
        callback: Arc<dyn ChunkReceivedCallback>,
        scheduler: Arc<dyn RetrySchedule>,
        injector: Option<Arc<dyn FetchFaultInjector>>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                location,
                replica,
                callback,
                scheduler,
                injector,
                max_tries: config.max_tries(),
                retry_wait: config.retry_wait,
                num_tries: Mutex::new(0),
                open_lock: Mutex::new(()),
            }),
        }
    }

    /// The partition location this client was bound to.
    pub fn location(&self) -> &PartitionLocation {
        &self.inner.location
    }

    /// Open the chunk stream, retrying transient failures with backoff.
    ///
    /// Blocks the calling thread. Intended to be called once per session,
    /// before any fetch.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(n))` - the stream is open and holds `n` chunks; the attempt
    ///   counter is reset to 0.
    /// - `Ok(None)` - the attempt budget was exhausted or a terminal error
    ///   occurred; the caller's failure callback has been invoked exactly
    ///   once and the attempt counter is reset to 0.
    /// - `Err(FetchError::Interrupted)` - the open attempt itself was
    ///   interrupted; never retried.
    pub fn open_chunks(&self) -> Result<Option<u32>, FetchError> {
        let _open = self.inner.open_lock.lock();

        let mut num_chunks: Option<u32> = None;
        let mut last_error: Option<FetchError> = None;

        while num_chunks.is_none() && self.has_remaining_tries() {
            let attempt = *self.inner.num_tries.lock();
            if attempt != 0 {
                info!(
                    attempt,
                    max_tries = self.inner.max_tries,
                    replica = %self.inner.replica.describe(),
                    wait_ms = self.inner.retry_wait.as_millis() as u64,
                    "retrying chunk stream open"
                );
                // Backoff waits are not interruptible; only a failure from
                // the open attempt itself can end the cycle early.
                thread::sleep(self.inner.retry_wait);
            }

            match self.try_open() {
                Ok(n) => num_chunks = Some(n),
                Err(FetchError::Interrupted) => return Err(FetchError::Interrupted),
                Err(e) => {
                    error!(
                        error = %e,
                        replica = %self.inner.replica.describe(),
                        "chunk stream open failed"
                    );
                    let retryable = self.should_retry(&e);
                    last_error = Some(e);
                    if retryable {
                        *self.inner.num_tries.lock() += 1;
                    } else {
                        break;
                    }
                }
            }
        }

        if num_chunks.is_none() {
            let attempts = *self.inner.num_tries.lock();
            self.inner.callback.on_failure(
                0,
                &self.inner.location,
                FetchError::OpenExhausted {
                    replica: self.inner.replica.describe(),
                    attempts,
                    source: last_error.take().map(Box::new),
                },
            );
        }

        *self.inner.num_tries.lock() = 0;
        Ok(num_chunks)
    }

    /// Fetch one chunk by index. Fire-and-forget.
    ///
    /// Never blocks and never fails synchronously: every outcome, including
    /// retry exhaustion, is delivered through the caller's callback. Fetches
    /// may be issued in any order and complete in any order; callers needing
    /// ordered chunks must reassemble by index.
    pub fn fetch_chunk(&self, chunk_index: u32) {
        let (decorator, injected) = {
            let tries = self.inner.num_tries.lock();
            let decorator = AttemptCallback {
                client: self.clone(),
                attempt: *tries,
            };
            let injected = self
                .inner
                .injector
                .as_ref()
                .and_then(|i| i.inject(chunk_index, &self.inner.location));
            (decorator, injected)
        };

        // An injected failure takes the normal failure path first; the real
        // fetch still proceeds below.
        if let Some(e) = injected {
            decorator.on_failure(chunk_index, &self.inner.location, e);
        }

        let dispatched = self.inner.replica.get_or_open_stream().and_then(|transport| {
            transport.fetch_chunk(
                self.inner.replica.stream_id(),
                chunk_index,
                Box::new(decorator.clone()),
            )
        });

        if let Err(e) = dispatched {
            error!(
                error = %e,
                chunk_index,
                attempt = decorator.attempt,
                "chunk fetch dispatch failed"
            );
            if self.should_retry(&e) {
                self.initiate_retry(chunk_index, decorator.attempt);
            } else {
                decorator.on_failure(chunk_index, &self.inner.location, e);
            }
        }
    }

    /// Attempts consumed so far in the current retry cycle.
    pub fn current_tries(&self) -> u32 {
        *self.inner.num_tries.lock()
    }

    fn try_open(&self) -> Result<u32, FetchError> {
        self.inner.replica.get_or_open_stream()?;
        self.inner.replica.num_chunks()
    }

    fn has_remaining_tries(&self) -> bool {
        *self.inner.num_tries.lock() < self.inner.max_tries
    }

    fn should_retry(&self, error: &FetchError) -> bool {
        error.is_transient() && self.has_remaining_tries()
    }

    /// Schedule a retried fetch on the shared executor after the backoff.
    ///
    /// The counter is advanced with a max-update rather than an increment:
    /// concurrent attempts for different chunks may resolve out of order, and
    /// a stale early-attempt completion must not move it backward.
    fn initiate_retry(&self, chunk_index: u32, current_attempt: u32) {
        {
            let mut tries = self.inner.num_tries.lock();
            *tries = (*tries).max(current_attempt + 1);
        }

        info!(
            attempt = current_attempt,
            max_tries = self.inner.max_tries,
            chunk_index,
            replica = %self.inner.replica.describe(),
            wait_ms = self.inner.retry_wait.as_millis() as u64,
            "scheduling chunk fetch retry"
        );

        let client = self.clone();
        self.inner.scheduler.schedule(
            self.inner.retry_wait,
            Box::new(move || client.fetch_chunk(chunk_index)),
        );
    }
}

/// Completion handler for one dispatched fetch attempt.
///
/// Captures the attempt counter at dispatch time so a retry scheduled from
/// its failure path is attributed to the attempt that actually failed, not to
/// whatever the counter has advanced to since.
#[derive(Clone)]
struct AttemptCallback {
    client: ChunkClient,
    attempt: u32,
}

impl ChunkReceivedCallback for AttemptCallback {
    fn on_success(&self, chunk_index: u32, buffer: Bytes, _location: &PartitionLocation) {
        // Report the originally bound location, never the copy that served.
        self.client
            .inner
            .callback
            .on_success(chunk_index, buffer, &self.client.inner.location);
    }

    fn on_failure(&self, chunk_index: u32, _location: &PartitionLocation, error: FetchError) {
        if self.client.should_retry(&error) {
            self.client.initiate_retry(chunk_index, self.attempt);
        } else {
            error!(
                error = %error,
                chunk_index,
                attempt = self.attempt,
                "abandoning chunk fetch"
            );
            self.client
                .inner
                .callback
                .on_failure(chunk_index, &self.client.inner.location, error);
        }
    }
}
