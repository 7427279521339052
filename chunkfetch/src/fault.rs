//! Deterministic fault injection for fetch verification.
//!
//! A [`FetchFaultInjector`] is consulted at the start of every fetch dispatch,
//! inside the client's critical section. Returning an error synthesizes a
//! failure that flows through the exact same classification and retry path as
//! a real transport fault, before the real fetch proceeds.
//!
//! The injector is a trait so tests can compose arbitrary fault patterns
//! without touching the orchestrator. [`ChunkIndexFaultInjector`] is the
//! stock implementation driven by
//! [`ClientConfig::test_fetch_failure_index`](crate::config::ClientConfig).

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::FetchError;
use crate::location::{Mode, PartitionLocation};

/// Hook producing synthetic fetch failures.
pub trait FetchFaultInjector: Send + Sync {
    /// Return an error to synthesize a failure for this dispatch, or `None`
    /// to let the fetch proceed untouched.
    fn inject(&self, chunk_index: u32, location: &PartitionLocation) -> Option<FetchError>;
}

/// Injects one failure for a configured chunk index.
///
/// Fires only when the fetched index matches the trigger, the bound location
/// is a master, and a peer copy exists - modelling a forced master-to-slave
/// failover. Fires at most once so exactly one deterministic failure is
/// observed per client.
pub struct ChunkIndexFaultInjector {
    trigger_index: u32,
    fired: AtomicBool,
}

impl ChunkIndexFaultInjector {
    /// Create an injector that triggers on `trigger_index`.
    pub fn new(trigger_index: u32) -> Self {
        Self {
            trigger_index,
            fired: AtomicBool::new(false),
        }
    }
}

impl FetchFaultInjector for ChunkIndexFaultInjector {
    fn inject(&self, chunk_index: u32, location: &PartitionLocation) -> Option<FetchError> {
        if chunk_index != self.trigger_index
            || location.mode() != Mode::Master
            || location.peer().is_none()
        {
            return None;
        }
        if self.fired.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(FetchError::Injected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn master_with_peer() -> PartitionLocation {
        let peer = PartitionLocation::new("p1", "worker-2", 9099, Mode::Slave);
        PartitionLocation::new("p1", "worker-1", 9099, Mode::Master).with_peer(peer)
    }

    #[test]
    fn test_fires_on_matching_index() {
        let injector = ChunkIndexFaultInjector::new(7);
        let err = injector.inject(7, &master_with_peer());
        assert!(matches!(err, Some(FetchError::Injected)));
    }

    #[test]
    fn test_fires_at_most_once() {
        let injector = ChunkIndexFaultInjector::new(7);
        let location = master_with_peer();
        assert!(injector.inject(7, &location).is_some());
        assert!(injector.inject(7, &location).is_none());
    }

    #[test]
    fn test_requires_master_mode() {
        let injector = ChunkIndexFaultInjector::new(7);
        let peer = PartitionLocation::new("p1", "worker-1", 9099, Mode::Master);
        let slave = PartitionLocation::new("p1", "worker-2", 9099, Mode::Slave).with_peer(peer);
        assert!(injector.inject(7, &slave).is_none());
    }

    #[test]
    fn test_requires_peer() {
        let injector = ChunkIndexFaultInjector::new(7);
        let lone = PartitionLocation::new("p1", "worker-1", 9099, Mode::Master);
        assert!(injector.inject(7, &lone).is_none());
    }

    proptest! {
        #[test]
        fn test_never_fires_for_other_indices(index in 0u32..1024) {
            prop_assume!(index != 7);
            let injector = ChunkIndexFaultInjector::new(7);
            prop_assert!(injector.inject(index, &master_with_peer()).is_none());
        }
    }
}
