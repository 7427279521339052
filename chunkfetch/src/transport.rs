//! Transport-layer contracts.
//!
//! The client never talks to the wire directly. It consumes a
//! [`TransportClient`] handed out by the replica and produces results to a
//! caller-supplied [`ChunkReceivedCallback`]. Both are trait seams so tests
//! can substitute mocks, matching the dependency-injection style used for the
//! stream layer.

use bytes::Bytes;
use std::fmt;

use crate::error::FetchError;
use crate::location::PartitionLocation;

/// Handle for an open partition stream, used to address chunk requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

/// Completion handler for a single chunk request.
///
/// The transport invokes exactly one of these methods per dispatched request,
/// on an arbitrary thread. Implementations must be safe to call from transport
/// I/O threads.
pub trait ChunkReceivedCallback: Send + Sync {
    /// The chunk arrived.
    fn on_success(&self, chunk_index: u32, buffer: Bytes, location: &PartitionLocation);

    /// The request failed.
    fn on_failure(&self, chunk_index: u32, location: &PartitionLocation, error: FetchError);
}

/// Asynchronous chunk transfer interface.
///
/// `fetch_chunk` must not block: the result is delivered later through the
/// callback. The per-attempt timeout lives inside the transport; a timeout
/// surfaces as [`FetchError::Timeout`] on the failure path.
pub trait TransportClient: Send + Sync {
    /// Request one chunk from an open stream.
    ///
    /// `Err` means the request could not be dispatched at all; the callback
    /// will not be invoked for this attempt. Once `Ok` is returned, exactly
    /// one callback invocation follows, on an arbitrary thread.
    fn fetch_chunk(
        &self,
        stream_id: StreamId,
        chunk_index: u32,
        callback: Box<dyn ChunkReceivedCallback>,
    ) -> Result<(), FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_id_display() {
        assert_eq!(format!("{}", StreamId(42)), "stream-42");
    }

    #[test]
    fn test_stream_id_equality() {
        assert_eq!(StreamId(7), StreamId(7));
        assert_ne!(StreamId(7), StreamId(8));
    }
}
