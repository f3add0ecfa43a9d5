//! Fan-out Dispatcher
//!
//! Delivers a decoded notification to every live connection joined to the
//! room its routing key names. The event keeps the name mapped from its
//! source channel, and the payload is forwarded unmodified.

use std::sync::Arc;

use super::channels;
use super::decoder::Notification;
use crate::websocket::ConnectionHub;

/// Fans decoded notifications out to conversation rooms.
///
/// The dispatcher never touches room membership; it only addresses rooms
/// through the hub. Dispatching the same notification twice delivers it
/// twice (at-least-once, no deduplication).
#[derive(Clone)]
pub struct Dispatcher {
    hub: Arc<ConnectionHub>,
}

impl Dispatcher {
    /// Create a dispatcher targeting the given connection hub
    pub fn new(hub: Arc<ConnectionHub>) -> Self {
        Self { hub }
    }

    /// Deliver one notification to its target room.
    ///
    /// A missing routing key, an unknown source channel, or an empty room is
    /// a no-op, not an error.
    pub async fn dispatch(&self, notification: &Notification) {
        let Some(event) = channels::outbound_event(&notification.channel) else {
            tracing::debug!(
                channel = %notification.channel,
                "notification from unmapped channel ignored"
            );
            return;
        };

        let Some(room) = notification.routing_key.as_deref() else {
            tracing::debug!(
                channel = %notification.channel,
                "notification without routing key dropped"
            );
            return;
        };

        let delivered = self
            .hub
            .emit(room, event, notification.payload.clone())
            .await;

        tracing::trace!(
            channel = %notification.channel,
            room = %room,
            event = %event,
            delivered,
            "dispatched notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::decoder::decode;
    use crate::websocket::{HubConfig, ServerMessage};
    use serde_json::json;
    use tokio::sync::mpsc;

    async fn hub_with_member(room: &str) -> (Arc<ConnectionHub>, mpsc::UnboundedReceiver<ServerMessage>) {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();
        hub.join(&id, vec![room.to_string()]).await.unwrap();
        (hub, rx)
    }

    #[tokio::test]
    async fn test_dispatch_to_joined_room() {
        let (hub, mut rx) = hub_with_member("room42").await;
        let dispatcher = Dispatcher::new(Arc::clone(&hub));

        let raw = br#"{"channelId": "room42", "text": "hello"}"#;
        let notification = decode(channels::GROUP_MESSAGE_PERSISTED, raw).unwrap();
        dispatcher.dispatch(&notification).await;

        match rx.try_recv().unwrap() {
            ServerMessage::Event { event, payload } => {
                assert_eq!(event, "group:message:persisted");
                assert_eq!(payload, json!({"channelId": "room42", "text": "hello"}));
            }
            other => panic!("expected Event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_skips_other_rooms() {
        let (hub, mut rx) = hub_with_member("room-a").await;
        let dispatcher = Dispatcher::new(hub);

        let raw = br#"{"channelId": "room-b", "text": "hi"}"#;
        let notification = decode(channels::MESSAGE_PERSISTED, raw).unwrap();
        dispatcher.dispatch(&notification).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dispatch_without_routing_key_is_noop() {
        let (hub, mut rx) = hub_with_member("room42").await;
        let dispatcher = Dispatcher::new(hub);

        let raw = br#"{"text": "unaddressed"}"#;
        let notification = decode(channels::MESSAGE_PERSISTED, raw).unwrap();
        dispatcher.dispatch(&notification).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dispatch_empty_room_is_noop() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let dispatcher = Dispatcher::new(hub);

        let raw = br#"{"channelId": "nobody-home"}"#;
        let notification = decode(channels::MESSAGE_PERSISTED, raw).unwrap();
        // Must not panic or error
        dispatcher.dispatch(&notification).await;
    }

    #[tokio::test]
    async fn test_dispatch_is_repeat_safe() {
        let (hub, mut rx) = hub_with_member("room42").await;
        let dispatcher = Dispatcher::new(hub);

        let raw = br#"{"channelId": "room42", "text": "again"}"#;
        let notification = decode(channels::MESSAGE_PERSISTED, raw).unwrap();
        dispatcher.dispatch(&notification).await;
        dispatcher.dispatch(&notification).await;

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }
}
