//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use docvault_realtime::InboundMessage;

use crate::state::AppState;

/// GET /ws — WebSocket upgrade.
///
/// Connections are open; a client identifies itself with a join message
/// after connecting. Record events are broadcast to every connection
/// either way.
pub async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_connection(state, socket))
}

/// Drives one established WebSocket connection.
async fn handle_connection(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (conn_id, mut outbound_rx) = state.hub.register();

    // Forward hub broadcasts to the client.
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => match InboundMessage::parse(text.as_str()) {
                Some(InboundMessage::Join { user_id }) => {
                    state.hub.identify(conn_id, user_id);
                }
                None => {
                    debug!(conn_id = %conn_id, "Ignoring unrecognized client message");
                }
            },
            Ok(Message::Close(_)) => break,
            // Pings are answered by axum itself.
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.hub.unregister(conn_id);
}
