//! Inbound WebSocket message types.
//!
//! Outbound traffic is the serialized [`RecordEvent`] from
//! `docvault-entity`; clients only ever send a join message after
//! connecting.
//!
//! [`RecordEvent`]: docvault_entity::event::RecordEvent

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message received from a WebSocket client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum InboundMessage {
    /// Client announces which user it belongs to.
    Join {
        /// The connecting user's ID.
        #[serde(rename = "userId")]
        user_id: Uuid,
    },
}

impl InboundMessage {
    /// Parse a raw text frame, returning `None` for anything that is
    /// not a recognized message.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join() {
        let id = Uuid::new_v4();
        let text = format!(r#"{{"type":"join","data":{{"userId":"{id}"}}}}"#);
        assert_eq!(
            InboundMessage::parse(&text),
            Some(InboundMessage::Join { user_id: id })
        );
    }

    #[test]
    fn test_garbage_is_ignored() {
        assert_eq!(InboundMessage::parse("not json"), None);
        assert_eq!(InboundMessage::parse(r#"{"type":"unknown"}"#), None);
    }
}
