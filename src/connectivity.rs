//! Platform connectivity indicator.
//!
//! The store treats connectivity as an external signal: it reads the current
//! value once when it starts and then reacts to transitions. `SimulatedNetwork`
//! is the in-process stand-in for the platform's online/offline indicator.

use std::sync::Arc;

use tokio::sync::watch;

/// A change in connectivity as seen by a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Connected,
    Disconnected,
}

impl ConnectivityEvent {
    pub fn is_connected(self) -> bool {
        self == ConnectivityEvent::Connected
    }
}

/// Anything that can report whether this endpoint is online.
pub trait ConnectivitySignal {
    /// Current value of the indicator.
    fn is_online(&self) -> bool;

    /// Start observing transitions from the current value.
    fn subscribe(&self) -> ConnectivityWatcher;
}

/// Value carried by the indicator channel.
///
/// `edges` counts every change of `online`, so a subscriber can tell that a
/// disconnect/reconnect happened even when both land between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkState {
    pub online: bool,
    pub edges: u64,
}

impl LinkState {
    pub fn new(online: bool) -> Self {
        Self { online, edges: 0 }
    }
}

/// Controllable network indicator. Clones share the same underlying flag.
#[derive(Debug, Clone)]
pub struct SimulatedNetwork {
    tx: Arc<watch::Sender<LinkState>>,
}

impl SimulatedNetwork {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(LinkState::new(online));
        Self { tx: Arc::new(tx) }
    }

    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if current.online == online {
                return false;
            }
            current.online = online;
            current.edges = current.edges.wrapping_add(1);
            true
        });
        if changed {
            tracing::debug!(online, "network indicator changed");
        }
    }

    pub fn go_online(&self) {
        self.set_online(true);
    }

    pub fn go_offline(&self) {
        self.set_online(false);
    }
}

impl ConnectivitySignal for SimulatedNetwork {
    fn is_online(&self) -> bool {
        self.tx.borrow().online
    }

    fn subscribe(&self) -> ConnectivityWatcher {
        ConnectivityWatcher::new(self.tx.subscribe())
    }
}

/// A live subscription to connectivity transitions.
///
/// Dropping the watcher releases the subscription.
#[derive(Debug)]
pub struct ConnectivityWatcher {
    rx: watch::Receiver<LinkState>,
    online: bool,
    edges: u64,
    replay: Option<bool>,
}

impl ConnectivityWatcher {
    pub fn new(mut rx: watch::Receiver<LinkState>) -> Self {
        let current = *rx.borrow_and_update();
        Self {
            rx,
            online: current.online,
            edges: current.edges,
            replay: None,
        }
    }

    /// Value as of the last reported transition.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Wait for the next connected/disconnected transition.
    ///
    /// A round trip that lands between two polls (offline then online again,
    /// or the reverse) is reported as both of its edges, in order. Longer runs
    /// of changes are reduced to at most two edges ending at the current
    /// value. Returns `None` once the signal source is gone.
    pub async fn next_transition(&mut self) -> Option<ConnectivityEvent> {
        if let Some(online) = self.replay.take() {
            return Some(self.report(online));
        }
        loop {
            self.rx.changed().await.ok()?;
            let current = *self.rx.borrow_and_update();
            let missed = current.edges.wrapping_sub(self.edges);
            self.edges = current.edges;
            if missed == 0 {
                continue;
            }
            if current.online == self.online {
                self.replay = Some(current.online);
                return Some(self.report(!current.online));
            }
            return Some(self.report(current.online));
        }
    }

    fn report(&mut self, online: bool) -> ConnectivityEvent {
        self.online = online;
        if online {
            ConnectivityEvent::Connected
        } else {
            ConnectivityEvent::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_transitions_only() {
        let network = SimulatedNetwork::new(false);
        let mut watcher = network.subscribe();
        assert!(!watcher.is_online());

        network.go_online();
        assert_eq!(watcher.next_transition().await, Some(ConnectivityEvent::Connected));
        assert!(watcher.is_online());

        network.go_online();
        network.go_offline();
        assert_eq!(watcher.next_transition().await, Some(ConnectivityEvent::Disconnected));
    }

    #[tokio::test]
    async fn round_trip_between_polls_reports_both_edges() {
        let network = SimulatedNetwork::new(true);
        let mut watcher = network.subscribe();

        network.go_offline();
        network.go_online();
        assert_eq!(watcher.next_transition().await, Some(ConnectivityEvent::Disconnected));
        assert!(!watcher.is_online());
        assert_eq!(watcher.next_transition().await, Some(ConnectivityEvent::Connected));
        assert!(watcher.is_online());

        // Three changes collapse to the net edge.
        network.go_offline();
        network.go_online();
        network.go_offline();
        assert_eq!(watcher.next_transition().await, Some(ConnectivityEvent::Disconnected));
        network.go_online();
        assert_eq!(watcher.next_transition().await, Some(ConnectivityEvent::Connected));
    }

    #[tokio::test]
    async fn ends_when_source_dropped() {
        let network = SimulatedNetwork::new(true);
        let mut watcher = network.subscribe();
        drop(network);
        assert_eq!(watcher.next_transition().await, None);
    }

    #[test]
    fn clones_share_state() {
        let network = SimulatedNetwork::new(true);
        let other = network.clone();
        other.go_offline();
        assert!(!network.is_online());
    }
}
