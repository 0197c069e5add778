//! Connection hub managing all active WebSocket clients.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use docvault_core::config::RealtimeConfig;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
#[derive(Debug)]
struct ConnectionHandle {
    /// User who identified themselves on this connection, if any.
    user_id: Option<Uuid>,
    /// Sender for serialized outbound messages.
    sender: mpsc::Sender<String>,
    /// When the connection was established.
    connected_at: DateTime<Utc>,
}

/// Manages all active WebSocket connections.
///
/// Broadcasting uses `try_send`: a client that cannot keep up loses
/// messages rather than stalling delivery to everyone else. Browser
/// clients refetch the listing on reconnect, so a dropped event is
/// recoverable.
#[derive(Debug)]
pub struct ConnectionHub {
    /// All live connections by ID.
    connections: DashMap<ConnectionId, ConnectionHandle>,
    /// Outbound buffer size per connection.
    buffer_size: usize,
}

impl ConnectionHub {
    /// Creates a new hub from realtime configuration.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            connections: DashMap::new(),
            buffer_size: config.channel_buffer_size,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns the connection ID and the receiver the socket task should
    /// drain into the client.
    pub fn register(&self) -> (ConnectionId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let id = Uuid::new_v4();

        self.connections.insert(
            id,
            ConnectionHandle {
                user_id: None,
                sender: tx,
                connected_at: Utc::now(),
            },
        );

        info!(conn_id = %id, total = self.connections.len(), "WebSocket connection registered");
        (id, rx)
    }

    /// Associates a user with an already-registered connection.
    pub fn identify(&self, conn_id: ConnectionId, user_id: Uuid) {
        if let Some(mut handle) = self.connections.get_mut(&conn_id) {
            handle.user_id = Some(user_id);
            debug!(conn_id = %conn_id, user_id = %user_id, "Connection identified");
        }
    }

    /// Removes a connection.
    pub fn unregister(&self, conn_id: ConnectionId) {
        if let Some((_, handle)) = self.connections.remove(&conn_id) {
            info!(
                conn_id = %conn_id,
                user_id = ?handle.user_id,
                connected_at = %handle.connected_at,
                total = self.connections.len(),
                "WebSocket connection closed"
            );
        }
    }

    /// Sends a serialized message to every connected client.
    ///
    /// Returns the number of clients the message was delivered to.
    pub fn broadcast(&self, message: &str) -> usize {
        let mut delivered = 0;
        for entry in self.connections.iter() {
            match entry.sender.try_send(message.to_string()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(conn_id = %entry.key(), "Client buffer full, dropping message");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(conn_id = %entry.key(), "Client gone, skipping");
                }
            }
        }
        delivered
    }

    /// Number of currently connected clients.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> ConnectionHub {
        ConnectionHub::new(&RealtimeConfig {
            channel_buffer_size: 2,
        })
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_clients() {
        let hub = hub();
        let (_a, mut rx_a) = hub.register();
        let (_b, mut rx_b) = hub.register();

        assert_eq!(hub.broadcast("hello"), 2);
        assert_eq!(rx_a.recv().await.unwrap(), "hello");
        assert_eq!(rx_b.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        let hub = hub();
        let (a, _rx_a) = hub.register();
        let (_b, _rx_b) = hub.register();

        hub.unregister(a);
        assert_eq!(hub.connection_count(), 1);
        assert_eq!(hub.broadcast("bye"), 1);
    }

    #[tokio::test]
    async fn test_slow_client_does_not_block_broadcast() {
        let hub = hub();
        let (_slow, _rx_slow) = hub.register();
        let (_ok, mut rx_ok) = hub.register();

        // The fast client drains as messages arrive; the slow one never
        // does, so its buffer (capacity 2) overflows on the third send.
        assert_eq!(hub.broadcast("1"), 2);
        assert_eq!(rx_ok.recv().await.unwrap(), "1");
        assert_eq!(hub.broadcast("2"), 2);
        assert_eq!(rx_ok.recv().await.unwrap(), "2");
        assert_eq!(hub.broadcast("3"), 1);
        assert_eq!(rx_ok.recv().await.unwrap(), "3");
    }

    #[tokio::test]
    async fn test_identify_attaches_user() {
        let hub = hub();
        let (id, _rx) = hub.register();
        hub.identify(id, Uuid::new_v4());
        hub.unregister(id);
        assert_eq!(hub.connection_count(), 0);
    }
}
