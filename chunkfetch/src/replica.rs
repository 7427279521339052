//! Replica contract.
//!
//! A replica binds one [`PartitionLocation`](crate::location::PartitionLocation)
//! copy to an open transport stream. Stream establishment, re-opening after a
//! broken connection, and switching to the peer copy on repeated failure all
//! live behind this trait; the client only sees "give me a working stream or
//! an error".

use std::sync::Arc;

use crate::error::FetchError;
use crate::transport::{StreamId, TransportClient};

/// One attempt binding of a partition location to an open stream.
///
/// Owned by a single client for its whole lifetime. Retries call back into
/// the same replica, which decides internally whether to reuse the stream,
/// re-open it, or fail over to its peer copy.
pub trait Replica: Send + Sync {
    /// Return the current transport stream, opening (or re-opening) it first
    /// if needed. Idempotent. May block on network I/O.
    fn get_or_open_stream(&self) -> Result<Arc<dyn TransportClient>, FetchError>;

    /// Identifier of the open stream. Valid after a successful
    /// [`get_or_open_stream`](Replica::get_or_open_stream).
    fn stream_id(&self) -> StreamId;

    /// Number of chunks in the partition. Valid after a successful
    /// [`get_or_open_stream`](Replica::get_or_open_stream).
    fn num_chunks(&self) -> Result<u32, FetchError>;

    /// Short description for log lines and exhaustion messages.
    fn describe(&self) -> String;
}
