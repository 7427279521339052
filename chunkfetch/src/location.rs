//! Partition location identity.
//!
//! A [`PartitionLocation`] names one physical copy of a logical shuffle
//! partition: where it lives, whether it is the master or the slave copy, and
//! (optionally) its peer copy. The client binds one location at construction
//! and always reports that same location to the caller, so failover between
//! copies stays invisible upstream.

use std::fmt;

/// Role of a partition copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Primary copy, tried first.
    Master,
    /// Redundant copy, used on failover.
    Slave,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Master => write!(f, "Master"),
            Mode::Slave => write!(f, "Slave"),
        }
    }
}

/// Identity of one copy of a logical partition.
///
/// Immutable for the lifetime of a client. The peer, when present, is a
/// snapshot of the other copy's identity (it does not link back).
#[derive(Clone, Debug)]
pub struct PartitionLocation {
    id: String,
    host: String,
    port: u16,
    mode: Mode,
    peer: Option<Box<PartitionLocation>>,
}

impl PartitionLocation {
    /// Create a location without a peer.
    pub fn new(id: impl Into<String>, host: impl Into<String>, port: u16, mode: Mode) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
            mode,
            peer: None,
        }
    }

    /// Attach the peer copy's identity.
    pub fn with_peer(mut self, peer: PartitionLocation) -> Self {
        self.peer = Some(Box::new(peer));
        self
    }

    /// Stable partition identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Host serving this copy.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port serving this copy.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Role of this copy.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The other copy of this partition, if one exists.
    pub fn peer(&self) -> Option<&PartitionLocation> {
        self.peer.as_deref()
    }
}

impl fmt::Display for PartitionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{} ({})", self.id, self.host, self.port, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_without_peer() {
        let loc = PartitionLocation::new("p12", "worker-1", 9099, Mode::Master);
        assert_eq!(loc.id(), "p12");
        assert_eq!(loc.host(), "worker-1");
        assert_eq!(loc.port(), 9099);
        assert_eq!(loc.mode(), Mode::Master);
        assert!(loc.peer().is_none());
    }

    #[test]
    fn test_location_with_peer() {
        let slave = PartitionLocation::new("p12", "worker-2", 9099, Mode::Slave);
        let master = PartitionLocation::new("p12", "worker-1", 9099, Mode::Master).with_peer(slave);

        let peer = master.peer().expect("peer should be present");
        assert_eq!(peer.mode(), Mode::Slave);
        assert_eq!(peer.host(), "worker-2");
        // Peer snapshot does not link back.
        assert!(peer.peer().is_none());
    }

    #[test]
    fn test_location_display() {
        let loc = PartitionLocation::new("p3", "worker-7", 7337, Mode::Slave);
        assert_eq!(format!("{}", loc), "p3@worker-7:7337 (Slave)");
    }
}
