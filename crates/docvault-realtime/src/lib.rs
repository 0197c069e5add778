//! # docvault-realtime
//!
//! WebSocket connection hub and record-change broadcasting. Every
//! connected browser client receives a JSON message whenever a record
//! is created, updated, or deleted.

pub mod hub;
pub mod message;
pub mod notifier;

pub use hub::ConnectionHub;
pub use message::InboundMessage;
pub use notifier::RealtimeNotifier;
