//! Relay error types

use thiserror::Error;

/// Errors from the broker-facing side of the relay
///
/// None of these are fatal to the process: connection-cycle errors feed the
/// reconnect policy, publish errors surface to the API caller.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Broker transport or protocol error
    #[error("broker error: {0}")]
    Broker(#[from] redis::RedisError),

    /// Payload could not be serialized for publishing
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
