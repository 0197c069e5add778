//! Real-time WebSocket configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound message buffer size per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_channel_buffer() -> usize {
    64
}
