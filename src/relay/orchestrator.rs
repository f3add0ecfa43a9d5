//! Relay Orchestrator
//!
//! Wires the broker subscriber to the decoder and dispatcher and owns the
//! subscription task's lifecycle. With no broker configured the relay starts
//! as an inactive handle rather than an error, so shutdown paths stay
//! uniform for callers.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use super::backoff::{LinearBackoff, ReconnectPolicy};
use super::dispatcher::Dispatcher;
use super::subscriber::{BrokerSubscriber, RelayState};
use crate::config::BrokerConfig;
use crate::websocket::ConnectionHub;

/// Entry point for starting the relay
pub struct Relay;

impl Relay {
    /// Start the relay against the given hub.
    ///
    /// `None` broker config yields an inactive handle in the `Disabled`
    /// state; this is a valid deployment mode, logged once as a warning.
    pub fn start(config: Option<BrokerConfig>, hub: Arc<ConnectionHub>) -> RelayHandle {
        Self::start_with_policy(config, hub, Box::new(LinearBackoff::default()))
    }

    /// Start the relay with a custom reconnect policy
    pub fn start_with_policy(
        config: Option<BrokerConfig>,
        hub: Arc<ConnectionHub>,
        policy: Box<dyn ReconnectPolicy>,
    ) -> RelayHandle {
        let Some(config) = config else {
            tracing::warn!("BROKER_HOST not configured, event relay disabled");
            return RelayHandle::inactive();
        };

        let state = Arc::new(RwLock::new(RelayState::Connecting));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let subscriber = BrokerSubscriber::new(config, policy, Arc::clone(&state));
        let dispatcher = Dispatcher::new(hub);
        let task = tokio::spawn(subscriber.run(dispatcher, shutdown_rx));

        RelayHandle {
            state,
            active: Some(ActiveRelay {
                shutdown: shutdown_tx,
                task,
            }),
        }
    }
}

struct ActiveRelay {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Handle to a running (or inactive) relay
///
/// The inactive form behaves identically for observation and shutdown, so
/// callers never branch on whether a broker was configured.
pub struct RelayHandle {
    state: Arc<RwLock<RelayState>>,
    active: Option<ActiveRelay>,
}

impl RelayHandle {
    /// Handle for a deployment with no broker configured
    pub fn inactive() -> Self {
        Self {
            state: Arc::new(RwLock::new(RelayState::Disabled)),
            active: None,
        }
    }

    /// Whether a subscription task is running
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Current lifecycle state
    pub async fn state(&self) -> RelayState {
        *self.state.read().await
    }

    /// Shared state cell, for health reporting
    pub fn state_handle(&self) -> Arc<RwLock<RelayState>> {
        Arc::clone(&self.state)
    }

    /// Stop the subscription task and release the broker socket.
    ///
    /// Safe to call on an inactive handle. In-flight messages may be dropped;
    /// delivery is at-least-once, not exactly-once.
    pub async fn shutdown(self) {
        if let Some(active) = self.active {
            let _ = active.shutdown.send(true);
            if let Err(e) = active.task.await {
                tracing::error!(error = %e, "relay task join failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::HubConfig;

    #[tokio::test]
    async fn test_no_broker_yields_inactive_handle() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let handle = Relay::start(None, hub);

        assert!(!handle.is_active());
        assert_eq!(handle.state().await, RelayState::Disabled);

        // Shutdown on an inactive handle is a uniform no-op
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_active_relay_shuts_down() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        // Unroutable host: the subscriber will cycle through reconnects until
        // shutdown is requested.
        let config = BrokerConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
        };
        let handle = Relay::start(Some(config), hub);
        assert!(handle.is_active());

        handle.shutdown().await;
    }
}
