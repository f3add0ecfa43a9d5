//! Message-Persisted Event Relay
//!
//! Bridges the durable broker to live WebSocket rooms: a single pub/sub
//! subscription on a fixed set of channels, and room-addressed fan-out of
//! every persisted-message notification under its original event name.
//!
//! ## Architecture
//!
//! - **channels**: the subscription set and the channel → event mapping table
//! - **decoder**: raw broker message → [`Notification`], failures isolated
//!   per message
//! - **dispatcher**: notification → room fan-out through the connection hub
//! - **subscriber**: broker connection lifecycle and the receive loop
//! - **backoff**: explicit reconnect policy
//! - **orchestrator**: wiring and the [`RelayHandle`] lifecycle
//! - **publisher**: publish side used by the API layer

pub mod backoff;
pub mod channels;
pub mod decoder;
pub mod dispatcher;
pub mod error;
pub mod orchestrator;
pub mod publisher;
pub mod subscriber;

pub use backoff::{LinearBackoff, ReconnectPolicy};
pub use decoder::{decode, DecodeError, Notification};
pub use dispatcher::Dispatcher;
pub use error::{RelayError, RelayResult};
pub use orchestrator::{Relay, RelayHandle};
pub use publisher::BrokerPublisher;
pub use subscriber::{BrokerSubscriber, RelayState};
