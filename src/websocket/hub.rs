//! WebSocket Connection Hub
//!
//! The connection registry: every live WebSocket connection and the set of
//! conversation rooms it has joined. Room membership is owned here and
//! mutated only through join/leave; the relay addresses rooms through
//! [`ConnectionHub::emit`] and never touches membership.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::ServerMessage;

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Manages all WebSocket connections and room membership
pub struct ConnectionHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: Arc<RwLock<HashMap<ConnectionId, ConnectionHandle>>>,
    /// Room membership: room → set of ConnectionIds
    rooms: Arc<RwLock<HashMap<String, HashSet<ConnectionId>>>>,
    /// Configuration
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
        }
    }
}

/// Handle for sending messages to a specific connection
pub struct ConnectionHandle {
    /// Channel sender for this connection
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Rooms this connection has joined
    pub rooms: HashSet<String>,
}

impl ConnectionHub {
    /// Create a new connection hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            rooms: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let connections = self.connections.read().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections);
        }
        drop(connections);

        let id = Uuid::new_v4().to_string();
        let handle = ConnectionHandle {
            sender,
            rooms: HashSet::new(),
        };

        self.connections.write().await.insert(id.clone(), handle);

        tracing::info!(connection_id = %id, "WebSocket connected");
        Ok(id)
    }

    /// Unregister a connection and remove it from all rooms
    pub async fn unregister(&self, id: &str) {
        let handle = self.connections.write().await.remove(id);

        if let Some(handle) = handle {
            let mut rooms = self.rooms.write().await;
            for room in handle.rooms {
                if let Some(members) = rooms.get_mut(&room) {
                    members.remove(id);
                    // Clean up empty rooms
                    if members.is_empty() {
                        rooms.remove(&room);
                    }
                }
            }
        }

        tracing::info!(connection_id = %id, "WebSocket disconnected");
    }

    /// Join a connection to rooms
    ///
    /// Empty room names are ignored. Returns the rooms actually joined.
    pub async fn join(&self, id: &str, rooms: Vec<String>) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections.get_mut(id).ok_or(HubError::ConnectionNotFound)?;

        let mut room_map = self.rooms.write().await;
        let mut joined = Vec::new();

        for room in rooms {
            if room.is_empty() {
                tracing::warn!(connection_id = %id, "empty room name ignored");
                continue;
            }

            handle.rooms.insert(room.clone());
            room_map
                .entry(room.clone())
                .or_insert_with(HashSet::new)
                .insert(id.to_string());

            joined.push(room);
        }

        tracing::debug!(
            connection_id = %id,
            rooms = ?joined,
            "joined rooms"
        );

        Ok(joined)
    }

    /// Remove a connection from rooms
    pub async fn leave(&self, id: &str, rooms: Vec<String>) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections.get_mut(id).ok_or(HubError::ConnectionNotFound)?;

        let mut room_map = self.rooms.write().await;
        let mut left = Vec::new();

        for room in rooms {
            if handle.rooms.remove(&room) {
                left.push(room.clone());

                if let Some(members) = room_map.get_mut(&room) {
                    members.remove(id);
                    if members.is_empty() {
                        room_map.remove(&room);
                    }
                }
            }
        }

        tracing::debug!(
            connection_id = %id,
            rooms = ?left,
            "left rooms"
        );

        Ok(left)
    }

    /// Emit an event to every connection joined to a room.
    ///
    /// An empty or unknown room delivers to nobody; that is not an error.
    /// Returns the number of connections the event was sent to.
    pub async fn emit(&self, room: &str, event: &str, payload: Value) -> usize {
        // Snapshot membership first; lock order elsewhere is connections
        // before rooms.
        let members = {
            let rooms = self.rooms.read().await;
            match rooms.get(room) {
                Some(members) => members.clone(),
                None => return 0,
            }
        };
        let connections = self.connections.read().await;

        let mut delivered = 0;
        for id in &members {
            if let Some(handle) = connections.get(id) {
                let message = ServerMessage::Event {
                    event: event.to_string(),
                    payload: payload.clone(),
                };
                if handle.sender.send(message).is_ok() {
                    delivered += 1;
                }
            }
        }

        if delivered > 0 {
            tracing::trace!(room = %room, event = %event, delivered, "emitted event to room");
        }
        delivered
    }

    /// Send a message directly to a specific connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle.sender.send(message).map_err(|_| HubError::SendFailed)
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Get the member count for a room
    pub async fn room_member_count(&self, room: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(room)
            .map(|members| members.len())
            .unwrap_or(0)
    }
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections")]
    TooManyConnections,

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}
