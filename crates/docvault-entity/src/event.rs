//! Record lifecycle events and the change-notifier seam.
//!
//! The lifecycle manager depends on the [`ChangeNotifier`] trait, not on a
//! concrete transport: the realtime crate provides the WebSocket fan-out
//! implementation, and tests inject [`NoopNotifier`]. Delivery is
//! best-effort, at-most-once; a failed emission never reaches the caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::FileRecord;

/// Events emitted after each successful record mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RecordEvent {
    /// A record was created.
    #[serde(rename = "file:created")]
    Created {
        /// The full record as persisted.
        record: FileRecord,
    },
    /// A record was updated (metadata or content).
    #[serde(rename = "file:updated")]
    Updated {
        /// The full post-update record.
        record: FileRecord,
    },
    /// A record was deleted.
    #[serde(rename = "file:deleted")]
    Deleted {
        /// The deleted record's id.
        id: Uuid,
    },
}

/// Fan-out sink for record lifecycle events.
///
/// Implementations must not block and must not fail the caller; anything
/// that can go wrong downstream is logged and swallowed.
pub trait ChangeNotifier: Send + Sync {
    /// Publish an event to all current subscribers, best-effort.
    fn publish(&self, event: RecordEvent);
}

/// A notifier that drops every event. Used in tests and as a stand-in
/// when the realtime channel is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn publish(&self, _event: RecordEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_event_wire_shape() {
        let id = Uuid::nil();
        let json = serde_json::to_value(RecordEvent::Deleted { id }).unwrap();
        assert_eq!(json["type"], "file:deleted");
        assert_eq!(json["data"]["id"], id.to_string());
    }
}
