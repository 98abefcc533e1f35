//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own presence bookkeeping and fan-out so the route handler
//! can stay focused on transport and protocol translation.

pub mod presence;
pub mod registry;
pub mod relay;
pub mod rooms;
