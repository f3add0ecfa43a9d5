//! WebSocket Message Types
//!
//! Frames exchanged between connected clients and the relay's transport
//! layer. Relay deliveries arrive as `event` frames whose `event` field is
//! the source broker channel name and whose `payload` is the notification
//! forwarded unmodified.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join direct conversation rooms
    Join {
        /// Room identifiers to join
        rooms: Vec<String>,
    },
    /// Leave conversation rooms
    Leave {
        /// Room identifiers to leave
        rooms: Vec<String>,
    },
    /// Join a group conversation; payload must carry `groupId`
    GroupJoin {
        #[serde(default)]
        payload: Value,
    },
    /// Leave a group conversation; payload must carry `groupId`
    GroupLeave {
        #[serde(default)]
        payload: Value,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A relayed notification for a room this connection has joined
    Event {
        /// Delivery event name (equals the source broker channel name)
        event: String,
        /// Full decoded notification payload, unmodified
        payload: Value,
    },
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// Rooms successfully joined
    Joined { rooms: Vec<String> },
    /// Rooms successfully left
    Left { rooms: Vec<String> },
    /// A client payload failed validation; all violations, in rule order
    ValidationFailed { errors: Vec<String> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
}
