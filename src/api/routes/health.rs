//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::api::state::AppState;
use crate::relay::RelayState;

/// Full health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Relay lifecycle state (`disabled` is healthy by design)
    pub relay: String,
    pub ws_connections: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe. The relay being disabled or mid-reconnect
/// does not make the transport layer unready; clients can still join rooms.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let relay = state.relay_state().await;

    let status = match relay {
        RelayState::Error => "degraded",
        _ => "healthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        relay: relay.as_str().to_string(),
        ws_connections: state.hub.connection_count().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness() {
        let status = readiness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
