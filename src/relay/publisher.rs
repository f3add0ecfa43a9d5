//! Broker Publisher
//!
//! Publish side of the broker connection, used by the API layer to put
//! validated payloads onto the persisted-message channels. The connection
//! is opened lazily on first publish, so an unreachable broker at startup
//! does not pin the message API down for the life of the process; once
//! established, the `ConnectionManager` reconnects on its own.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::error::RelayResult;
use crate::config::BrokerConfig;

/// Publishes notifications to broker channels
#[derive(Clone)]
pub struct BrokerPublisher {
    config: BrokerConfig,
    conn: Arc<Mutex<Option<ConnectionManager>>>,
}

impl BrokerPublisher {
    /// Create a publisher; no connection is made until the first publish.
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the cached connection, opening one if none exists yet.
    ///
    /// A failed attempt leaves the slot empty, so the next publish
    /// retries from scratch.
    async fn connection(&self) -> RelayResult<ConnectionManager> {
        let mut slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let client = redis::Client::open(self.config.url())?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!(url = %self.config.url(), "broker publisher connected");

        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Publish a JSON payload to a channel.
    ///
    /// Returns the number of broker-side subscribers that received it.
    pub async fn publish(&self, channel: &str, payload: &Value) -> RelayResult<i64> {
        let body = serde_json::to_string(payload)?;
        let mut conn = self.connection().await?;
        let receivers: i64 = conn.publish(channel, body).await?;

        tracing::debug!(channel = %channel, receivers, "published notification");
        Ok(receivers)
    }
}
