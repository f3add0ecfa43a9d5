//! Broker Subscription Manager
//!
//! Owns the single long-lived pub/sub connection to the broker, subscribes to
//! the fixed channel set, and pipes every received message through
//! decode → dispatch. One message at a time: a message is fully processed
//! before the next is taken off the stream, so client delivery order matches
//! broker delivery order per channel.
//!
//! No failure here crashes the process. Connection-cycle errors feed the
//! reconnect policy; a malformed message is logged and skipped.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{watch, RwLock};

use super::backoff::ReconnectPolicy;
use super::channels;
use super::decoder;
use super::dispatcher::Dispatcher;
use super::error::RelayResult;
use crate::config::BrokerConfig;

/// Lifecycle state of the broker subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// No broker configured; terminal, the relay is inert
    Disabled,
    /// Attempting to establish the transport connection
    Connecting,
    /// Transport connected, subscribe request not yet acknowledged
    Connected,
    /// Subscribed to the full channel set, relaying messages
    Subscribed,
    /// Last connection cycle ended with a transport error
    Error,
    /// Connection closed (by either side, or by shutdown)
    Closed,
}

impl RelayState {
    /// Lowercase name for health reporting
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayState::Disabled => "disabled",
            RelayState::Connecting => "connecting",
            RelayState::Connected => "connected",
            RelayState::Subscribed => "subscribed",
            RelayState::Error => "error",
            RelayState::Closed => "closed",
        }
    }
}

/// How one connection cycle ended
enum ListenExit {
    /// Shutdown was requested
    Shutdown,
    /// The broker closed the message stream
    StreamEnded,
}

/// Owns the broker pub/sub connection and the receive loop.
///
/// The connection handle never leaves this type; other components only see
/// decoded notifications through the dispatcher.
pub struct BrokerSubscriber {
    config: BrokerConfig,
    policy: Box<dyn ReconnectPolicy>,
    state: Arc<RwLock<RelayState>>,
}

impl BrokerSubscriber {
    pub fn new(
        config: BrokerConfig,
        policy: Box<dyn ReconnectPolicy>,
        state: Arc<RwLock<RelayState>>,
    ) -> Self {
        Self {
            config,
            policy,
            state,
        }
    }

    /// Run the subscription loop until shutdown is signalled.
    ///
    /// Each connection cycle: connect, subscribe to the fixed set, relay
    /// messages. On error or stream end, wait per the reconnect policy and
    /// start a new cycle.
    pub async fn run(self, dispatcher: Dispatcher, mut shutdown: watch::Receiver<bool>) {
        let mut attempt: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.set_state(RelayState::Connecting).await;
            match self
                .listen(&dispatcher, &mut shutdown, &mut attempt)
                .await
            {
                Ok(ListenExit::Shutdown) => break,
                Ok(ListenExit::StreamEnded) => {
                    self.set_state(RelayState::Closed).await;
                    tracing::warn!("broker connection closed");
                }
                Err(e) => {
                    self.set_state(RelayState::Error).await;
                    tracing::error!(error = %e, "broker connection error");
                }
            }

            attempt += 1;
            let delay = self.policy.next_delay(attempt);
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "waiting before broker reconnect"
            );
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(RelayState::Closed).await;
        tracing::info!("broker subscriber stopped");
    }

    /// One connection cycle. Dropping the pub/sub handle on return releases
    /// the socket.
    async fn listen(
        &self,
        dispatcher: &Dispatcher,
        shutdown: &mut watch::Receiver<bool>,
        attempt: &mut u32,
    ) -> RelayResult<ListenExit> {
        let client = redis::Client::open(self.config.url())?;
        let mut pubsub = client.get_async_pubsub().await?;

        self.set_state(RelayState::Connected).await;
        tracing::info!(
            host = %self.config.host,
            port = self.config.port,
            "connected to broker"
        );

        if let Err(e) = pubsub.subscribe(&channels::SUBSCRIBED_CHANNELS[..]).await {
            tracing::error!(
                channels = ?channels::SUBSCRIBED_CHANNELS,
                error = %e,
                "broker subscribe failed"
            );
            return Err(e.into());
        }

        self.set_state(RelayState::Subscribed).await;
        tracing::info!(
            count = channels::SUBSCRIBED_CHANNELS.len(),
            channels = ?channels::SUBSCRIBED_CHANNELS,
            "subscribed to broker channels"
        );
        *attempt = 0;

        let mut stream = pubsub.on_message();
        loop {
            tokio::select! {
                _ = shutdown.changed() => return Ok(ListenExit::Shutdown),
                msg = stream.next() => match msg {
                    Some(msg) => {
                        let channel = msg.get_channel_name().to_string();
                        process_raw_message(dispatcher, &channel, msg.get_payload_bytes()).await;
                    }
                    None => return Ok(ListenExit::StreamEnded),
                }
            }
        }
    }

    async fn set_state(&self, state: RelayState) {
        let mut current = self.state.write().await;
        if *current != state {
            tracing::debug!(from = current.as_str(), to = state.as_str(), "relay state");
            *current = state;
        }
    }
}

/// Decode one raw broker message and dispatch it.
///
/// A decode failure only drops that single message; the subscription and all
/// other messages are unaffected.
pub(crate) async fn process_raw_message(dispatcher: &Dispatcher, channel: &str, raw: &[u8]) {
    match decoder::decode(channel, raw) {
        Ok(notification) => dispatcher.dispatch(&notification).await,
        Err(e) => {
            tracing::warn!(channel = %channel, error = %e, "dropping undecodable broker message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::{ConnectionHub, HubConfig, ServerMessage};
    use serde_json::json;
    use tokio::sync::mpsc;

    #[test]
    fn test_state_names() {
        assert_eq!(RelayState::Disabled.as_str(), "disabled");
        assert_eq!(RelayState::Subscribed.as_str(), "subscribed");
    }

    #[tokio::test]
    async fn test_bad_message_does_not_block_next() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();
        hub.join(&id, vec!["c1".to_string()]).await.unwrap();

        let dispatcher = Dispatcher::new(hub);

        process_raw_message(&dispatcher, channels::MESSAGE_PERSISTED, b"{bad json").await;
        process_raw_message(
            &dispatcher,
            channels::MESSAGE_PERSISTED,
            br#"{"channelId":"c1","text":"hi"}"#,
        )
        .await;

        // Only the valid message was delivered
        match rx.try_recv().unwrap() {
            ServerMessage::Event { event, payload } => {
                assert_eq!(event, "message:persisted");
                assert_eq!(payload, json!({"channelId": "c1", "text": "hi"}));
            }
            other => panic!("expected Event, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unmapped_channel_not_relayed() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();
        hub.join(&id, vec!["c1".to_string()]).await.unwrap();

        let dispatcher = Dispatcher::new(hub);
        process_raw_message(
            &dispatcher,
            "message:deleted",
            br#"{"channelId":"c1"}"#,
        )
        .await;

        assert!(rx.try_recv().is_err());
    }
}
