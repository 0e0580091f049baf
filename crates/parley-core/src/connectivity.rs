//! Connectivity monitoring
//!
//! The monitor is an injected, observable service: the engine holds a
//! watch receiver rather than reading ambient global state. Any
//! reachability signal source (OS callbacks, a heartbeat probe, CLI
//! flags) can drive [`ConnectivityMonitor::set`].

use tokio::sync::watch;

/// Current connectivity, process-wide; only the latest value matters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Online,
    Offline,
}

/// Observable connectivity source
///
/// Notifies watchers at most once per actual transition; setting the
/// same state twice produces no duplicate notification.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    tx: std::sync::Arc<watch::Sender<ConnectivityState>>,
}

impl ConnectivityMonitor {
    /// Create a monitor reporting the given initial state
    pub fn new(initial: ConnectivityState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// The current connectivity state
    pub fn current(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    /// Report a connectivity change
    ///
    /// Returns whether the state actually changed; repeated identical
    /// states are dropped without notifying watchers.
    pub fn set(&self, state: ConnectivityState) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        })
    }

    /// Subscribe to transition notifications
    pub fn watch(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(ConnectivityState::Offline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_reflects_initial_state() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
        assert_eq!(monitor.current(), ConnectivityState::Online);
    }

    #[test]
    fn test_set_updates_current() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
        assert!(monitor.set(ConnectivityState::Offline));
        assert_eq!(monitor.current(), ConnectivityState::Offline);
    }

    #[test]
    fn test_repeated_state_is_deduplicated() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Offline);
        let mut rx = monitor.watch();

        assert!(!monitor.set(ConnectivityState::Offline));
        assert!(!rx.has_changed().unwrap());

        assert!(monitor.set(ConnectivityState::Online));
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_watchers_see_transitions() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Offline);
        let mut rx = monitor.watch();

        monitor.set(ConnectivityState::Online);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectivityState::Online);
    }
}
