//! # Courier
//!
//! Message-persisted event relay. Courier subscribes to a fixed set of
//! channels on a durable broker and fans every persisted-message
//! notification out, under its original event name, to the WebSocket
//! connections joined to the addressed conversation room.
//!
//! ## Features
//!
//! - **Room-addressed fan-out**: notifications reach exactly the connections
//!   joined to the target conversation
//! - **Failure isolation**: one malformed broker message never disrupts the
//!   subscription or other messages
//! - **Explicit reconnection**: linear-capped backoff behind a policy trait
//! - **Accumulating validation**: client payloads are checked against all
//!   rules, and every violation is surfaced at once
//!
//! ## Modules
//!
//! - [`relay`]: broker subscription, decoding, and room fan-out
//! - [`websocket`]: live connections and room membership
//! - [`validation`]: payload acceptance rules
//! - [`api`]: thin HTTP surface with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier::api::{serve, AppState};
//! use courier::config::Config;
//! use courier::relay::Relay;
//! use courier::websocket::{ConnectionHub, HubConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!
//!     let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
//!     let relay = Relay::start(config.broker.clone(), Arc::clone(&hub));
//!
//!     let state = AppState::new(config.api.clone(), hub, relay.state_handle(), None);
//!     serve(state, &config.api).await?;
//!
//!     relay.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod relay;
pub mod validation;
pub mod websocket;

// Re-export top-level types for convenience
pub use relay::{
    BrokerPublisher, DecodeError, Dispatcher, LinearBackoff, Notification, ReconnectPolicy,
    Relay, RelayError, RelayHandle, RelayState,
};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage,
};

pub use validation::{
    validate_group_action, validate_message_payload, ValidationResult, MAX_CONTENT_LENGTH,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, BrokerConfig, Config, ConfigError, LoggingConfig};
