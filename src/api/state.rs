//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::ApiConfig;
use crate::relay::{BrokerPublisher, RelayState};
use crate::websocket::ConnectionHub;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// WebSocket connection hub (the connection registry)
    pub hub: Arc<ConnectionHub>,
    /// Relay lifecycle state, for health reporting
    pub relay_state: Arc<RwLock<RelayState>>,
    /// Broker publish side; `None` when no broker is configured
    pub publisher: Option<BrokerPublisher>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        config: ApiConfig,
        hub: Arc<ConnectionHub>,
        relay_state: Arc<RwLock<RelayState>>,
        publisher: Option<BrokerPublisher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            hub,
            relay_state,
            publisher,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Current relay lifecycle state
    pub async fn relay_state(&self) -> RelayState {
        *self.relay_state.read().await
    }
}
