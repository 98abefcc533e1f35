//! Connection registry — per-socket bookkeeping.
//!
//! DESIGN
//! ======
//! Maps an ephemeral connection id to the (username, room) it is associated
//! with. A connection is registered with no association at connect time and
//! gains one on join. The association is the disconnect handler's only way
//! to recover which membership entry a dying socket was contributing to, so
//! absence is a valid outcome, not an error: it means the connection never
//! joined, or already left explicitly.

use std::collections::HashMap;

use crate::state::ConnId;

/// The (username, room) a connection is currently contributing to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub username: String,
    pub room_id: String,
}

/// Registry of live connections. One entry per open socket.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnId, Option<Association>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Record a new connection with no room association.
    pub fn register(&mut self, conn_id: ConnId) {
        self.entries.entry(conn_id).or_insert(None);
    }

    /// Associate a connection with a (username, room), overwriting any prior
    /// association. A connection tracks at most one room; joining a second
    /// room silently replaces tracking of the first.
    pub fn associate(&mut self, conn_id: ConnId, username: &str, room_id: &str) {
        self.entries.insert(
            conn_id,
            Some(Association { username: username.to_owned(), room_id: room_id.to_owned() }),
        );
    }

    /// Clear a connection's association while keeping it registered. After
    /// an explicit leave this makes the eventual disconnect a pure no-op.
    pub fn dissociate(&mut self, conn_id: ConnId) {
        if let Some(slot) = self.entries.get_mut(&conn_id) {
            *slot = None;
        }
    }

    /// Look up a connection's association. `None` covers both unknown
    /// connections and registered-but-unjoined ones.
    #[must_use]
    pub fn lookup(&self, conn_id: ConnId) -> Option<&Association> {
        self.entries.get(&conn_id).and_then(Option::as_ref)
    }

    /// Delete a connection entirely. Idempotent.
    pub fn remove(&mut self, conn_id: ConnId) {
        self.entries.remove(&conn_id);
    }

    /// Number of registered connections, joined or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
