//! Broker Channels
//!
//! The fixed set of broker channels the relay subscribes to, and the mapping
//! from broker channel to the event name delivered to clients. The mapping is
//! identity today, but it is kept as a data table so the outbound names can
//! change without touching dispatch logic.

/// Channel carrying direct-message persisted notifications.
pub const MESSAGE_PERSISTED: &str = "message:persisted";

/// Channel carrying group-message persisted notifications.
pub const GROUP_MESSAGE_PERSISTED: &str = "group:message:persisted";

/// The subscription set. Resubscription after a reconnect must request exactly
/// this set, no more, no fewer.
pub const SUBSCRIBED_CHANNELS: [&str; 2] = [MESSAGE_PERSISTED, GROUP_MESSAGE_PERSISTED];

/// Payload field identifying the target conversation room.
pub const ROUTING_KEY_FIELD: &str = "channelId";

/// Channel → outbound client event name.
const CHANNEL_EVENTS: [(&str, &str); 2] = [
    (MESSAGE_PERSISTED, MESSAGE_PERSISTED),
    (GROUP_MESSAGE_PERSISTED, GROUP_MESSAGE_PERSISTED),
];

/// Resolve the outbound event name for a broker channel.
///
/// Returns `None` for channels outside the subscription set; such messages
/// are not relayed.
pub fn outbound_event(channel: &str) -> Option<&'static str> {
    CHANNEL_EVENTS
        .iter()
        .find(|(name, _)| *name == channel)
        .map(|(_, event)| *event)
}
