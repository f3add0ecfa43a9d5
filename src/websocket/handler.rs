//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.
//! Group join/leave requests are gated through the group-action validator
//! before membership changes; violations are returned to the client verbatim.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::validation::validate_group_action;

/// WebSocket upgrade handler
///
/// This is the entry point for WebSocket connections.
/// It upgrades the HTTP connection to WebSocket and starts message handling.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<ConnectionHub>) {
    let (mut sender, mut receiver) = socket.split();

    // Channel for messages addressed to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match hub.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Ok(text) = serde_json::to_string(&error_msg) {
                let _ = sender.send(Message::Text(text)).await;
            }
            return;
        }
    };

    let connected_msg = ServerMessage::Connected {
        connection_id: connection_id.clone(),
    };
    let connected_text = match serde_json::to_string(&connected_msg) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize connected message");
            hub.unregister(&connection_id).await;
            return;
        }
    };
    if sender.send(Message::Text(connected_text)).await.is_err() {
        tracing::error!(connection_id = %connection_id, "Failed to send connected message");
        hub.unregister(&connection_id).await;
        return;
    }

    let conn_id_for_send = connection_id.clone();

    // Forward messages from the hub channel to the WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            connection_id = %conn_id_for_send,
                            "WebSocket send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize message");
                }
            }
        }
    });

    let hub_for_recv = Arc::clone(&hub);
    let conn_id_for_recv = connection_id.clone();

    // Receive messages from the WebSocket and handle them
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&hub_for_recv, &conn_id_for_recv, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(
    hub: &Arc<ConnectionHub>,
    connection_id: &str,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    handle_client_message(hub, connection_id, client_msg).await;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        error = %e,
                        "Invalid client message"
                    );
                    // Report but keep the connection open
                    let error_msg = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = hub.send_to(connection_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_msg = ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            };
            let _ = hub.send_to(connection_id, error_msg).await;
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}

/// Handle a parsed client message
async fn handle_client_message(
    hub: &Arc<ConnectionHub>,
    connection_id: &str,
    message: ClientMessage,
) {
    match message {
        ClientMessage::Join { rooms } => match hub.join(connection_id, rooms).await {
            Ok(joined) => {
                let _ = hub
                    .send_to(connection_id, ServerMessage::Joined { rooms: joined })
                    .await;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "Join error");
                let _ = hub
                    .send_to(
                        connection_id,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    )
                    .await;
            }
        },
        ClientMessage::Leave { rooms } => match hub.leave(connection_id, rooms).await {
            Ok(left) => {
                let _ = hub
                    .send_to(connection_id, ServerMessage::Left { rooms: left })
                    .await;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "Leave error");
                let _ = hub
                    .send_to(
                        connection_id,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    )
                    .await;
            }
        },
        ClientMessage::GroupJoin { payload } => {
            if let Some(group_id) = validated_group_id(hub, connection_id, &payload).await {
                match hub.join(connection_id, vec![group_id]).await {
                    Ok(joined) => {
                        let _ = hub
                            .send_to(connection_id, ServerMessage::Joined { rooms: joined })
                            .await;
                    }
                    Err(e) => {
                        let _ = hub
                            .send_to(
                                connection_id,
                                ServerMessage::Error {
                                    message: e.to_string(),
                                },
                            )
                            .await;
                    }
                }
            }
        }
        ClientMessage::GroupLeave { payload } => {
            if let Some(group_id) = validated_group_id(hub, connection_id, &payload).await {
                match hub.leave(connection_id, vec![group_id]).await {
                    Ok(left) => {
                        let _ = hub
                            .send_to(connection_id, ServerMessage::Left { rooms: left })
                            .await;
                    }
                    Err(e) => {
                        let _ = hub
                            .send_to(
                                connection_id,
                                ServerMessage::Error {
                                    message: e.to_string(),
                                },
                            )
                            .await;
                    }
                }
            }
        }
        ClientMessage::Ping => {
            let _ = hub.send_to(connection_id, ServerMessage::Pong).await;
        }
    }
}

/// Run a group action payload through the validator.
///
/// On failure the accumulated errors are sent back verbatim and `None` is
/// returned. Numeric identifiers are coerced to their string form; other
/// non-string kinds are rejected with an error frame so the client always
/// gets a response.
async fn validated_group_id(
    hub: &Arc<ConnectionHub>,
    connection_id: &str,
    payload: &Value,
) -> Option<String> {
    let result = validate_group_action(payload);
    if !result.is_valid {
        let _ = hub
            .send_to(
                connection_id,
                ServerMessage::ValidationFailed {
                    errors: result.errors,
                },
            )
            .await;
        return None;
    }

    match payload.get("groupId") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => {
            let _ = hub
                .send_to(
                    connection_id,
                    ServerMessage::Error {
                        message: "groupId must be a string".to_string(),
                    },
                )
                .await;
            None
        }
    }
}
