//! Error types for chunk fetching.
//!
//! [`FetchError`] covers every failure the client can observe or produce:
//!
//! - Transient transport faults (network I/O, timeouts) that the retry loop
//!   absorbs while attempt budget remains
//! - Terminal faults (interruption, unclassified runtime failures) that are
//!   surfaced immediately
//! - `OpenExhausted`, the terminal wrapper delivered once the open cycle runs
//!   out of attempts

use thiserror::Error;

/// Errors raised while opening a chunk stream or fetching chunks.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network I/O failure. Transient.
    #[error("network error: {message}")]
    Network {
        /// What failed.
        message: String,
        /// Underlying I/O error, when one exists.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The transport's per-attempt timeout fired. Transient.
    #[error("timed out: {message}")]
    Timeout {
        /// What timed out.
        message: String,
    },

    /// The blocking open call was interrupted. Terminal, never retried.
    #[error("interrupted while opening chunk stream")]
    Interrupted,

    /// Synthetic failure produced by a fault injector. Classified transient
    /// so it exercises the same retry and failover path as a real fault.
    #[error("manually triggered fetch failure")]
    Injected,

    /// The open cycle exhausted its attempt budget.
    #[error("could not open chunks from {replica} after {attempts} tries")]
    OpenExhausted {
        /// Description of the replica that kept failing.
        replica: String,
        /// Attempts consumed before giving up.
        attempts: u32,
        /// Last error recorded during the cycle, if any.
        #[source]
        source: Option<Box<FetchError>>,
    },

    /// Unclassified runtime failure. Terminal unless its immediate cause is
    /// a network or timeout error.
    #[error("{message}")]
    Runtime {
        /// What failed.
        message: String,
        /// Wrapped cause, when one exists.
        #[source]
        source: Option<Box<FetchError>>,
    },
}

impl FetchError {
    /// Network failure without an underlying I/O error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Network failure wrapping an I/O error.
    pub fn network_io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Timeout failure.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Unclassified runtime failure.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            source: None,
        }
    }

    /// Runtime failure wrapping another error as its cause.
    pub fn runtime_caused_by(message: impl Into<String>, cause: FetchError) -> Self {
        Self::Runtime {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Whether this failure is worth retrying, budget permitting.
    ///
    /// True for network I/O failures and timeouts, for injected failures, and
    /// for a runtime failure whose *immediate* cause is one of those. The
    /// check is one level deep, not a walk of the full source chain.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Injected => true,
            Self::Runtime {
                source: Some(cause),
                ..
            } => matches!(cause.as_ref(), Self::Network { .. } | Self::Timeout { .. }),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_and_timeout_are_transient() {
        assert!(FetchError::network("connection reset").is_transient());
        assert!(
            FetchError::network_io("read failed", std::io::Error::other("broken pipe"))
                .is_transient()
        );
        assert!(FetchError::timeout("fetch timed out").is_transient());
    }

    #[test]
    fn test_injected_is_transient() {
        assert!(FetchError::Injected.is_transient());
    }

    #[test]
    fn test_interrupted_and_runtime_are_terminal() {
        assert!(!FetchError::Interrupted.is_transient());
        assert!(!FetchError::runtime("unexpected frame").is_transient());
    }

    #[test]
    fn test_runtime_with_transient_cause_is_transient() {
        let err = FetchError::runtime_caused_by("decode failed", FetchError::timeout("slow link"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_runtime_with_terminal_cause_is_terminal() {
        let err =
            FetchError::runtime_caused_by("decode failed", FetchError::runtime("bad header"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_cause_check_is_one_level_deep() {
        // Transient error buried two levels down does not count.
        let inner = FetchError::runtime_caused_by("middle", FetchError::network("reset"));
        let outer = FetchError::runtime_caused_by("outer", inner);
        assert!(!outer.is_transient());
    }

    #[test]
    fn test_open_exhausted_is_terminal() {
        let err = FetchError::OpenExhausted {
            replica: "worker-1".to_string(),
            attempts: 3,
            source: Some(Box::new(FetchError::network("refused"))),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_open_exhausted_display_names_replica_and_attempts() {
        let err = FetchError::OpenExhausted {
            replica: "worker-1".to_string(),
            attempts: 3,
            source: None,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("worker-1"));
        assert!(msg.contains("3 tries"));
    }

    #[test]
    fn test_source_chain_is_preserved() {
        use std::error::Error;

        let err = FetchError::network_io("read failed", std::io::Error::other("broken pipe"));
        let source = err.source().expect("io source should be attached");
        assert!(source.to_string().contains("broken pipe"));
    }
}
