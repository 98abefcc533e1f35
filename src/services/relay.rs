//! Message relay — stateless chat fan-out.
//!
//! DESIGN
//! ======
//! Chat payloads never touch membership state: the relay reads the room id
//! out of the payload itself and pushes the verbatim payload to every other
//! attached connection under that key. The stated room id is trusted over
//! the sender's registered room, and an unknown room id simply reaches
//! nobody. Delivery is best-effort with no ordering guarantee beyond event
//! arrival order.

use tracing::debug;

use crate::event::{Data, ServerEvent};
use crate::services::rooms::Room;
use crate::state::{AppState, ConnId};

/// Push an event to every attached connection in a room, optionally
/// excluding one. Best-effort: a client whose channel is full is skipped.
pub fn fan_out(room: &Room, event: &ServerEvent, exclude: Option<ConnId>) {
    for (conn_id, tx) in &room.clients {
        if exclude == Some(*conn_id) {
            continue;
        }
        let _ = tx.try_send(event.clone());
    }
}

/// Relay a `send_message` payload to all other members of the room named in
/// the payload, excluding the sender's own connection.
pub async fn relay(state: &AppState, sender: ConnId, payload: Data) {
    let room_id = payload
        .get("roomId")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
        .to_owned();

    let presence = state.presence.read().await;
    let Some(room) = presence.rooms.room(&room_id) else {
        return;
    };

    debug!(%sender, room_id, "relaying message");
    fan_out(room, &ServerEvent::ReceiveMessage(payload), Some(sender));
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
