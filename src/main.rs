//! Courier Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Environment variables:
//! - `BROKER_HOST`: Broker host; setting this enables the relay
//!   (default when set without a config file: 127.0.0.1)
//! - `BROKER_PORT`: Broker port (default: 6379)
//! - `COURIER_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `COURIER_API_PORT`: Port to listen on (default: 8080)
//! - `COURIER_LOG_LEVEL`: Log level (default: info)
//! - `COURIER_LOG_FORMAT`: Log format, `pretty` or `json` (default: pretty)
//! - `RUST_LOG`: Overrides the log filter entirely

use courier::api::{serve, AppState};
use courier::config::Config;
use courier::relay::{BrokerPublisher, Relay};
use courier::websocket::{ConnectionHub, HubConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("courier={},tower_http=debug", config.logging.level).into()
    });
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Courier v{}", env!("CARGO_PKG_VERSION"));

    let hub = Arc::new(ConnectionHub::new(HubConfig {
        max_connections: config.api.max_ws_connections,
    }));

    // Relay: inactive when no broker is configured
    let relay = Relay::start(config.broker.clone(), Arc::clone(&hub));

    // Publish side, used by the message API; connects on first publish
    let publisher = config.broker.clone().map(BrokerPublisher::new);

    let state = AppState::new(
        config.api.clone(),
        Arc::clone(&hub),
        relay.state_handle(),
        publisher,
    );

    serve(state, &config.api).await?;

    // Close the broker connection before exit
    tracing::info!("Shutting down relay...");
    relay.shutdown().await;
    tracing::info!("Courier stopped");

    Ok(())
}
