//! Event — the wire protocol for the study-room realtime layer.
//!
//! ARCHITECTURE
//! ============
//! Every socket message is a JSON envelope `{ "event": <name>, "data": ... }`.
//! Inbound envelopes decode into [`ClientEvent`], a closed set the ws route
//! dispatches on exhaustively; outbound traffic is a [`ServerEvent`]. The
//! event names and camelCase payload fields match what the browser client
//! already speaks.
//!
//! DESIGN
//! ======
//! - The protocol is permissive: missing `roomId`/`username` default to the
//!   empty string and flow through as opaque keys, never as errors.
//! - `send_message` payloads are an open map passed through verbatim —
//!   sender-defined fields are relayed, not validated.
//! - Undecodable frames surface as [`EventError`]; the caller logs and drops
//!   them. No error event is ever emitted back to the client.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Flat key-value payload. Alias to reduce noise in signatures.
pub type Data = HashMap<String, serde_json::Value>;

/// Events consumed by the core (client → server).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Join (or reconnect to) a room under a username.
    JoinRoom {
        #[serde(rename = "roomId", default)]
        room_id: String,
        #[serde(default)]
        username: String,
    },
    /// Chat payload; carries its own `roomId` and is relayed verbatim.
    SendMessage(Data),
    /// Explicitly leave a room.
    LeaveRoom {
        #[serde(rename = "roomId", default)]
        room_id: String,
        #[serde(default)]
        username: String,
    },
}

/// Events produced by the core (server → client).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Updated participant list for the room, in join order.
    RoomData { participants: Vec<String> },
    /// A relayed `send_message` payload, unchanged.
    ReceiveMessage(Data),
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("invalid event json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one inbound text frame.
///
/// # Errors
///
/// Returns [`EventError::Json`] if the frame is not a known envelope.
pub fn decode(text: &str) -> Result<ClientEvent, EventError> {
    Ok(serde_json::from_str(text)?)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_join_room() {
        let event = decode(r#"{"event":"join_room","data":{"roomId":"R1","username":"ada"}}"#).expect("decode");
        assert_eq!(event, ClientEvent::JoinRoom { room_id: "R1".into(), username: "ada".into() });
    }

    #[test]
    fn decode_join_room_missing_fields_defaults_to_empty() {
        let event = decode(r#"{"event":"join_room","data":{}}"#).expect("decode");
        assert_eq!(event, ClientEvent::JoinRoom { room_id: String::new(), username: String::new() });
    }

    #[test]
    fn decode_send_message_keeps_sender_fields() {
        let event =
            decode(r#"{"event":"send_message","data":{"roomId":"R1","text":"hi","avatar":"cat.png"}}"#).expect("decode");
        let ClientEvent::SendMessage(payload) = event else {
            panic!("expected send_message");
        };
        assert_eq!(payload.get("roomId").and_then(|v| v.as_str()), Some("R1"));
        assert_eq!(payload.get("text").and_then(|v| v.as_str()), Some("hi"));
        assert_eq!(payload.get("avatar").and_then(|v| v.as_str()), Some("cat.png"));
    }

    #[test]
    fn decode_unknown_event_is_an_error() {
        assert!(decode(r#"{"event":"shutdown_server","data":{}}"#).is_err());
        assert!(decode("not json").is_err());
    }

    #[test]
    fn encode_room_data_envelope() {
        let event = ServerEvent::RoomData { participants: vec!["ada".into(), "grace".into()] };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value, json!({ "event": "room_data", "data": { "participants": ["ada", "grace"] } }));
    }

    #[test]
    fn encode_receive_message_is_verbatim_payload() {
        let mut payload = Data::new();
        payload.insert("roomId".into(), json!("R1"));
        payload.insert("text".into(), json!("hello"));
        payload.insert("sentAt".into(), json!(1_700_000_000));

        let value = serde_json::to_value(ServerEvent::ReceiveMessage(payload)).expect("serialize");
        assert_eq!(value.get("event").and_then(|v| v.as_str()), Some("receive_message"));
        assert_eq!(value["data"]["text"], json!("hello"));
        assert_eq!(value["data"]["sentAt"], json!(1_700_000_000));
    }

    #[test]
    fn client_event_json_round_trip() {
        let original = ClientEvent::LeaveRoom { room_id: "R9".into(), username: "ada".into() };
        let json = serde_json::to_string(&original).expect("serialize");
        assert!(json.contains(r#""event":"leave_room""#));
        assert!(json.contains(r#""roomId":"R9""#));
        let restored = decode(&json).expect("decode");
        assert_eq!(restored, original);
    }
}
