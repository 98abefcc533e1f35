//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor —
//! there are no ambient singletons. It holds the presence state behind one
//! `RwLock`: every presence event takes the write guard for its whole
//! mutation-plus-broadcast, which is the async equivalent of a
//! single-threaded event loop's run-to-completion semantics. Fan-out inside
//! the guard is non-blocking (`try_send`), so no lock is held across socket
//! I/O.

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::services::registry::ConnectionRegistry;
use crate::services::rooms::RoomTable;

/// Ephemeral per-socket identifier, reissued on every reconnect.
pub type ConnId = Uuid;

// =============================================================================
// PRESENCE STATE
// =============================================================================

/// All mutable presence state, owned in one place and accessed only through
/// the registry and room-table contracts.
pub struct PresenceState {
    /// Connection id → (username, room) association.
    pub registry: ConnectionRegistry,
    /// Room id → membership counts and live client senders.
    pub rooms: RoomTable,
}

impl PresenceState {
    #[must_use]
    pub fn new() -> Self {
        Self { registry: ConnectionRegistry::new(), rooms: RoomTable::new() }
    }
}

impl Default for PresenceState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum — the inner state is
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub presence: Arc<RwLock<PresenceState>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self { presence: Arc::new(RwLock::new(PresenceState::new())) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use tokio::sync::mpsc;

    use super::*;
    use crate::event::ServerEvent;
    use crate::services::presence;

    /// Create an empty `AppState`.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new()
    }

    /// Connect a fresh socket and join it to a room, returning the connection
    /// id and the receiver its broadcasts arrive on.
    pub async fn join_conn(
        state: &AppState,
        room_id: &str,
        username: &str,
    ) -> (ConnId, mpsc::Receiver<ServerEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(32);
        presence::connect(state, conn_id).await;
        presence::join_room(state, conn_id, room_id, username, tx.clone()).await;
        // The ws handler keeps its own sender for the socket's lifetime, so a
        // detach in the room table never closes the channel; keep this sender
        // alive to match, or `assert_no_event` would see the closed channel.
        std::mem::forget(tx);
        (conn_id, rx)
    }
}
