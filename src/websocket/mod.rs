//! WebSocket Transport Layer
//!
//! Live client connections and conversation-room membership.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: the connection registry; rooms and who is in them
//! - **Handler**: WebSocket upgrade and per-connection message loop
//! - **Messages**: client and server frame formats
//!
//! Clients connect to `/ws`, join conversation rooms (`join`, or
//! `group_join` with a `groupId` payload), and receive relayed
//! persisted-message notifications as `event` frames named after the source
//! broker channel.

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
