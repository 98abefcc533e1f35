//! Presence coordinator — the lifecycle state machine for connections.
//!
//! ARCHITECTURE
//! ============
//! Per connection the states are `Unjoined -> Joined -> (Left | Disconnected)`.
//! `Left` and `Disconnected` are both terminal for a connection instance;
//! a reconnect starts over at `Unjoined` under a fresh connection id. This
//! module is the sole mutator of the registry and the membership table.
//!
//! DESIGN
//! ======
//! Each event runs under one write guard, so the registry mutation, the
//! membership mutation, the participant snapshot, and the fan-out are atomic
//! with respect to every other event. Broadcast policy is deliberately
//! asymmetric: every join/reconnect broadcasts the participant list to the
//! whole room (including the joiner), but a decrement broadcasts only when
//! the user's last connection goes — partial decrements from multi-tab
//! presence are common and not newsworthy.

use tokio::sync::mpsc;
use tracing::info;

use crate::event::ServerEvent;
use crate::services::relay;
use crate::state::{AppState, ConnId, PresenceState};

/// Register a new connection in the `Unjoined` state. No broadcast.
pub async fn connect(state: &AppState, conn_id: ConnId) {
    let mut presence = state.presence.write().await;
    presence.registry.register(conn_id);
    info!(%conn_id, "client connected");
}

/// Join a room: associate the connection, attach its sender, count the
/// membership, and broadcast the updated participant list to everyone in
/// the room — on first joins and reconnects alike.
pub async fn join_room(
    state: &AppState,
    conn_id: ConnId,
    room_id: &str,
    username: &str,
    tx: mpsc::Sender<ServerEvent>,
) {
    let mut presence = state.presence.write().await;
    presence.registry.associate(conn_id, username, room_id);
    presence.rooms.attach(room_id, conn_id, tx);
    let (connections, first_join) = presence.rooms.increment(room_id, username);

    if first_join {
        info!(%conn_id, room_id, username, "joined room");
    } else {
        info!(%conn_id, room_id, username, connections, "reconnected to room");
    }

    broadcast_room_data(&presence, room_id);
}

/// Explicitly leave a room, then clear the connection's association so the
/// eventual disconnect becomes a pure no-op.
pub async fn leave_room(state: &AppState, conn_id: ConnId, room_id: &str, username: &str) {
    let mut presence = state.presence.write().await;
    leave_locked(&mut presence, conn_id, room_id, username);
    presence.registry.dissociate(conn_id);
}

/// Implicit leave on socket close. If the connection never joined (or
/// already left), only the registry entry is removed.
pub async fn disconnect(state: &AppState, conn_id: ConnId) {
    let mut presence = state.presence.write().await;
    if let Some(assoc) = presence.registry.lookup(conn_id).cloned() {
        leave_locked(&mut presence, conn_id, &assoc.room_id, &assoc.username);
    }
    presence.registry.remove(conn_id);
    info!(%conn_id, "client disconnected");
}

/// Shared decrement path for explicit leave and disconnect. The sender is
/// detached first so the leaver never observes its own departure broadcast.
fn leave_locked(presence: &mut PresenceState, conn_id: ConnId, room_id: &str, username: &str) {
    presence.rooms.detach(room_id, conn_id);

    match presence.rooms.decrement(room_id, username) {
        Some((_, true)) => {
            info!(%conn_id, room_id, username, "left room");
            broadcast_room_data(presence, room_id);
            if presence.rooms.evict_if_empty(room_id) {
                info!(room_id, "evicted empty room");
            }
        }
        Some((connections, false)) => {
            info!(%conn_id, room_id, username, connections, "connection closed, user still present");
        }
        // Absent room or username: a leave racing a disconnect. Tolerated.
        None => {}
    }
}

/// Snapshot the participant list and fan it out to the whole room,
/// including the connection that triggered the change.
fn broadcast_room_data(presence: &PresenceState, room_id: &str) {
    let participants = presence.rooms.participants(room_id);
    if let Some(room) = presence.rooms.room(room_id) {
        relay::fan_out(room, &ServerEvent::RoomData { participants }, None);
    }
}

#[cfg(test)]
#[path = "presence_test.rs"]
mod tests;
