//! Connection registry.
//!
//! Owns the set of active connection handles. The only mutators are
//! add-on-connect and remove-on-disconnect; broadcast never blocks the
//! relay loop (a peer whose queue is full is dropped instead).

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

/// Opaque identifier for one connection.
pub type ConnectionId = u64;

/// Registry of active connections and their outbound queues.
///
/// Dropping a connection's sender closes its writer task, which closes the
/// WebSocket.
#[derive(Default)]
pub struct Registry {
    peers: DashMap<ConnectionId, mpsc::Sender<Vec<u8>>>,
    next_id: AtomicU64,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection, returning its id.
    pub fn register(&self, tx: mpsc::Sender<Vec<u8>>) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.peers.insert(id, tx);
        id
    }

    /// Remove a connection on disconnect. Idempotent.
    pub fn deregister(&self, id: ConnectionId) {
        self.peers.remove(&id);
    }

    /// Number of currently registered connections.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Deliver a payload verbatim to every connection except the sender.
    ///
    /// Returns the number of peers the payload was queued for. Peers whose
    /// queue is full or closed are dropped from the registry; the relay
    /// never waits for a slow consumer.
    pub fn broadcast_from(&self, sender: ConnectionId, payload: &[u8]) -> usize {
        let mut delivered = 0;
        let mut stale = Vec::new();

        for entry in self.peers.iter() {
            let id = *entry.key();
            if id == sender {
                continue;
            }
            match entry.value().try_send(payload.to_vec()) {
                Ok(()) => delivered += 1,
                Err(_) => stale.push(id),
            }
        }

        for id in stale {
            tracing::warn!(connection = id, "dropping unresponsive peer");
            self.peers.remove(&id);
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_deregister() {
        let registry = Registry::new();
        let (tx, _rx) = mpsc::channel(4);
        let id = registry.register(tx);
        assert_eq!(registry.len(), 1);
        registry.deregister(id);
        assert!(registry.is_empty());
        // Idempotent
        registry.deregister(id);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let registry = Registry::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        let a = registry.register(tx_a);
        let _b = registry.register(tx_b);

        let delivered = registry.broadcast_from(a, b"ping");
        assert_eq!(delivered, 1);
        assert_eq!(rx_b.try_recv().unwrap(), b"ping".to_vec());
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_drops_full_queue() {
        let registry = Registry::new();
        let (tx_a, _rx_a) = mpsc::channel(4);
        let (tx_b, _rx_b) = mpsc::channel(1);
        let a = registry.register(tx_a);
        let _b = registry.register(tx_b);

        assert_eq!(registry.broadcast_from(a, b"one"), 1);
        // Queue of b is now full: b gets dropped from the registry.
        assert_eq!(registry.broadcast_from(a, b"two"), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_broadcast_to_nobody() {
        let registry = Registry::new();
        let (tx, _rx) = mpsc::channel(4);
        let a = registry.register(tx);
        assert_eq!(registry.broadcast_from(a, b"lonely"), 0);
    }
}
