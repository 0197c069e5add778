//! HTTP and WebSocket request handlers.

pub mod auth;
pub mod health;
pub mod record;
pub mod user;
pub mod ws;
