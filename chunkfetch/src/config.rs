//! Client configuration surface.

use std::time::Duration;

/// Default number of I/O retries after the initial attempt.
pub const DEFAULT_IO_RETRIES: u32 = 3;

/// Default backoff between attempts (5 seconds).
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(5);

/// Default per-attempt fetch timeout enforced by the transport (2 minutes).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for a [`ChunkClient`](crate::client::ChunkClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Number of retries after the initial attempt. The total attempt budget
    /// is `io_retries + 1`.
    pub io_retries: u32,

    /// Fixed backoff inserted before each retried attempt.
    pub retry_wait: Duration,

    /// Per-attempt fetch timeout, handed to the replica/transport layer.
    pub fetch_timeout: Duration,

    /// Chunk index that triggers one synthetic fetch failure. Test-only;
    /// `None` disables injection.
    pub test_fetch_failure_index: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            io_retries: DEFAULT_IO_RETRIES,
            retry_wait: DEFAULT_RETRY_WAIT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            test_fetch_failure_index: None,
        }
    }
}

impl ClientConfig {
    /// Set the number of I/O retries.
    pub fn with_io_retries(mut self, io_retries: u32) -> Self {
        self.io_retries = io_retries;
        self
    }

    /// Set the backoff between attempts.
    pub fn with_retry_wait(mut self, retry_wait: Duration) -> Self {
        self.retry_wait = retry_wait;
        self
    }

    /// Set the per-attempt fetch timeout.
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Arm fault injection for one chunk index.
    pub fn with_test_fetch_failure_index(mut self, chunk_index: u32) -> Self {
        self.test_fetch_failure_index = Some(chunk_index);
        self
    }

    /// Total attempt budget: the initial attempt plus every retry.
    pub fn max_tries(&self) -> u32 {
        self.io_retries + 1
    }
}
