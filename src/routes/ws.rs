//! WebSocket handler — transport for the presence and chat core.
//!
//! DESIGN
//! ======
//! On upgrade, generates a connection id and enters a `select!` loop:
//! - Incoming text frames → decode + dispatch at a single point
//! - Broadcast events from room peers → serialize + forward to the client
//!
//! The dispatch function is transport-free so tests can drive the full
//! event path without a socket.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register the connection (no welcome frame; the client only
//!    learns room state from `room_data` broadcasts)
//! 2. Client emits `join_room` / `send_message` / `leave_room`
//! 3. Close or transport error → implicit disconnect → registry cleanup

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::event::{self, ClientEvent, ServerEvent};
use crate::services::{presence, relay};
use crate::state::{AppState, ConnId};

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();

    // Per-connection channel for receiving broadcast events from room peers.
    let (client_tx, mut client_rx) = mpsc::channel::<ServerEvent>(256);

    presence::connect(&state, conn_id).await;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        dispatch_event(&state, conn_id, &client_tx, &text).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    // Voluntary or involuntary close both land here exactly once.
    presence::disconnect(&state, conn_id).await;
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Decode one inbound text frame and dispatch it. The single entry point
/// for every client event; undecodable frames are logged and dropped with
/// no error event back to the client.
pub(crate) async fn dispatch_event(
    state: &AppState,
    conn_id: ConnId,
    client_tx: &mpsc::Sender<ServerEvent>,
    text: &str,
) {
    let event = match event::decode(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%conn_id, error = %e, "ws: dropping undecodable event");
            return;
        }
    };

    match event {
        ClientEvent::JoinRoom { room_id, username } => {
            presence::join_room(state, conn_id, &room_id, &username, client_tx.clone()).await;
        }
        ClientEvent::SendMessage(payload) => {
            relay::relay(state, conn_id, payload).await;
        }
        ClientEvent::LeaveRoom { room_id, username } => {
            presence::leave_room(state, conn_id, &room_id, &username).await;
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), ()> {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize event");
            return Err(());
        }
    };
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
