//! Bridges record changes into the WebSocket hub.

use std::sync::Arc;

use tracing::{debug, error};

use docvault_entity::event::{ChangeNotifier, RecordEvent};

use crate::hub::ConnectionHub;

/// [`ChangeNotifier`] implementation that broadcasts every record event
/// to all connected WebSocket clients.
#[derive(Debug, Clone)]
pub struct RealtimeNotifier {
    hub: Arc<ConnectionHub>,
}

impl RealtimeNotifier {
    /// Creates a notifier backed by the given hub.
    pub fn new(hub: Arc<ConnectionHub>) -> Self {
        Self { hub }
    }
}

impl ChangeNotifier for RealtimeNotifier {
    fn publish(&self, event: RecordEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => {
                let delivered = self.hub.broadcast(&payload);
                debug!(delivered, "Broadcast record event");
            }
            Err(e) => {
                // A failed broadcast must never fail the write that
                // triggered it.
                error!(error = %e, "Failed to serialize record event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::config::RealtimeConfig;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_publish_reaches_connected_client() {
        let hub = Arc::new(ConnectionHub::new(&RealtimeConfig {
            channel_buffer_size: 8,
        }));
        let (_id, mut rx) = hub.register();

        let record_id = Uuid::new_v4();
        RealtimeNotifier::new(hub).publish(RecordEvent::Deleted { id: record_id });

        let payload = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "file:deleted");
        assert_eq!(value["data"]["id"], record_id.to_string());
    }
}
