//! Error types for Parley
//!
//! Collaborator failures (feed, cache) carry their sources; the engine
//! converts every collaborator error into a [`SyncError`] kind before it
//! reaches the event channel, so nothing propagates as an uncaught fault.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Recoverable errors surfaced by the sync engine on its event channel
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// A remote operation failed because connectivity was lost mid-flight.
    /// The operation already fell back to the offline path; this is a
    /// non-blocking notice, not a hard failure.
    #[error("remote operation failed while connectivity was lost: {0}")]
    ConnectivityTransient(String),

    /// The remote store rejected an append/delete for a reason other than
    /// connectivity. Local state is unchanged.
    #[error("remote feed rejected the operation: {0}")]
    RemoteOperationFailed(String),

    /// A cache save/load failed. The in-memory list remains authoritative
    /// for the running session.
    #[error("cache persistence failed: {0}")]
    CachePersistenceFailed(String),

    /// The live subscription terminated unexpectedly and could not be
    /// re-established. The engine stays on its cache-backed list until
    /// connectivity changes.
    #[error("live subscription failed: {0}")]
    SubscriptionError(String),
}

/// Errors from a remote feed implementation
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed could not be reached; typically a dropped connection.
    /// Transient: retried or routed to the offline path by the engine.
    #[error("feed unavailable: {0}")]
    Unavailable(String),

    /// The feed refused the request (invalid payload, unknown channel, ...)
    #[error("feed rejected the request: {0}")]
    Rejected(String),

    /// The feed answered with something the client could not interpret
    #[error("feed protocol error: {0}")]
    Protocol(String),
}

impl FeedError {
    /// Whether retrying after connectivity returns is reasonable
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::Unavailable(_))
    }
}

/// Errors from the local cache store
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache snapshot '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write cache snapshot '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The snapshot exists but cannot be parsed. The file is left in
    /// place; the caller decides whether to start from an empty list.
    #[error("cache snapshot '{path}' is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_error_transience() {
        assert!(FeedError::Unavailable("connection reset".into()).is_transient());
        assert!(!FeedError::Rejected("empty payload".into()).is_transient());
        assert!(!FeedError::Protocol("bad frame".into()).is_transient());
    }

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::SubscriptionError("socket closed".into());
        assert!(err.to_string().contains("socket closed"));

        let err = SyncError::ConnectivityTransient("timed out".into());
        assert!(err.to_string().contains("connectivity"));
    }

    #[test]
    fn test_cache_error_display_includes_path() {
        let err = CacheError::Write {
            path: PathBuf::from("/data/messages.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/messages.json"));
        assert!(msg.contains("denied"));
    }
}
