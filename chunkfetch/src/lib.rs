//! ChunkFetch - resilient read-path client for a distributed shuffle service.
//!
//! A shuffle partition lives as indexed chunks behind one or more redundant
//! copies. This crate provides the client that reads it: open the partition
//! once ([`ChunkClient::open_chunks`]), then fetch chunks by index
//! ([`ChunkClient::fetch_chunk`]) while the client transparently absorbs
//! transient network failures, paces retries with backoff, and lets the
//! replica fail over between copies without the caller ever noticing.
//!
//! The transport and replica layers are trait seams ([`TransportClient`],
//! [`Replica`]); this crate owns only the retry and failover orchestration
//! around them.

pub mod client;
pub mod config;
pub mod error;
pub mod fault;
pub mod location;
pub mod replica;
pub mod retry;
pub mod transport;

pub use client::ChunkClient;
pub use config::ClientConfig;
pub use error::FetchError;
pub use fault::{ChunkIndexFaultInjector, FetchFaultInjector};
pub use location::{Mode, PartitionLocation};
pub use replica::Replica;
pub use retry::{RetryExecutor, RetrySchedule};
pub use transport::{ChunkReceivedCallback, StreamId, TransportClient};
