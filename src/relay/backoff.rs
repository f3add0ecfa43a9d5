//! Reconnect Policy
//!
//! Makes the relay's reconnection curve an explicit, test-reproducible policy
//! instead of an opaque property of the broker client library.

use std::time::Duration;

/// Decides how long to wait before the next reconnection attempt.
///
/// `attempt` starts at 1 for the first retry and resets after a successful
/// subscribe.
pub trait ReconnectPolicy: Send + Sync {
    /// Delay before reconnection attempt number `attempt`.
    fn next_delay(&self, attempt: u32) -> Duration;
}

/// Linear-capped backoff: `attempt × step`, capped at `max`.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    /// Per-attempt increment
    pub step: Duration,
    /// Upper bound on the delay
    pub max: Duration,
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(500),
            max: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy for LinearBackoff {
    fn next_delay(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.max)
    }
}
