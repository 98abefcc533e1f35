//! Room membership table — counted, insertion-ordered presence per room.
//!
//! DESIGN
//! ======
//! A user may hold several live connections to the same room (one per tab),
//! so membership is a multiset: room id → username → connection count. The
//! participant list is derived on every mutation, never stored, and keeps
//! join order. Usernames are opaque strings supplied by the caller; no
//! normalization or validation happens here.
//!
//! Rooms also carry the live sender for each attached connection — the
//! fan-out targets for broadcasts. A room is created lazily on first attach
//! or increment and evicted once both maps are empty.
//!
//! ERROR HANDLING
//! ==============
//! `decrement` tolerates absent rooms and usernames by returning `None`, and
//! clamps at zero: disconnects racing explicit leaves must degrade to no-ops,
//! never to negative counts or panics.

use std::collections::HashMap;

use indexmap::IndexMap;
use tokio::sync::mpsc;

use crate::event::ServerEvent;
use crate::state::ConnId;

// =============================================================================
// ROOM
// =============================================================================

/// Per-room live state.
pub struct Room {
    /// Username → live connection count, in join order. Entries at count 0
    /// are removed immediately and are never observable.
    counts: IndexMap<String, u32>,
    /// Attached connections: conn id → sender for outgoing events.
    pub clients: HashMap<ConnId, mpsc::Sender<ServerEvent>>,
}

impl Room {
    fn new() -> Self {
        Self { counts: IndexMap::new(), clients: HashMap::new() }
    }

    /// Live connection count for a username, if present.
    #[must_use]
    pub fn count(&self, username: &str) -> Option<u32> {
        self.counts.get(username).copied()
    }
}

// =============================================================================
// ROOM TABLE
// =============================================================================

/// All rooms, keyed by opaque room id.
#[derive(Default)]
pub struct RoomTable {
    rooms: HashMap<String, Room>,
}

impl RoomTable {
    #[must_use]
    pub fn new() -> Self {
        Self { rooms: HashMap::new() }
    }

    /// Attach a connection's sender to a room, creating the room lazily.
    /// The counterpart of socket-level room subscription.
    pub fn attach(&mut self, room_id: &str, conn_id: ConnId, tx: mpsc::Sender<ServerEvent>) {
        self.rooms
            .entry(room_id.to_owned())
            .or_insert_with(Room::new)
            .clients
            .insert(conn_id, tx);
    }

    /// Detach a connection's sender from a room. Idempotent; absent rooms
    /// and connections are tolerated.
    pub fn detach(&mut self, room_id: &str, conn_id: ConnId) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.clients.remove(&conn_id);
        }
    }

    /// Count one more live connection for (room, username). Returns the new
    /// count and whether this was the user's first connection to the room
    /// (0→1). The flag distinguishes "joined" from "reconnected" in logs
    /// only — it never gates a broadcast.
    pub fn increment(&mut self, room_id: &str, username: &str) -> (u32, bool) {
        let room = self.rooms.entry(room_id.to_owned()).or_insert_with(Room::new);
        let count = room.counts.entry(username.to_owned()).or_insert(0);
        let first_join = *count == 0;
        *count += 1;
        (*count, first_join)
    }

    /// Count one fewer live connection for (room, username). At zero the
    /// username entry is deleted and `fully_left` is true. Absent room or
    /// username returns `None` — a silent no-op, by contract.
    pub fn decrement(&mut self, room_id: &str, username: &str) -> Option<(u32, bool)> {
        let room = self.rooms.get_mut(room_id)?;
        let count = room.counts.get_mut(username)?;
        if *count <= 1 {
            room.counts.shift_remove(username);
            Some((0, true))
        } else {
            *count -= 1;
            Some((*count, false))
        }
    }

    /// Snapshot of the room's participants in join order. Empty if the room
    /// is absent.
    #[must_use]
    pub fn participants(&self, room_id: &str) -> Vec<String> {
        self.rooms
            .get(room_id)
            .map(|room| room.counts.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Drop the room key once nothing references it: no counted members and
    /// no attached senders. Returns whether an eviction happened.
    pub fn evict_if_empty(&mut self, room_id: &str) -> bool {
        let empty = self
            .rooms
            .get(room_id)
            .is_some_and(|room| room.counts.is_empty() && room.clients.is_empty());
        if empty {
            self.rooms.remove(room_id);
        }
        empty
    }

    #[must_use]
    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
#[path = "rooms_test.rs"]
mod tests;
