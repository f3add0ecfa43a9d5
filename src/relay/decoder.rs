//! Event Decoder
//!
//! Parses raw broker messages into structured notifications. Decode failures
//! are isolated per message: the caller logs and skips the bad message without
//! touching the subscription or other in-flight messages.

use serde_json::Value;
use thiserror::Error;

use super::channels;

/// A decoded broker notification
///
/// Immutable once constructed; created per received message and discarded
/// after dispatch. Persistence already happened upstream before the
/// notification was published.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Broker channel the message arrived on
    pub channel: String,
    /// Target conversation room, taken from the payload's `channelId` field.
    /// Absent or non-string routing keys are the dispatcher's concern.
    pub routing_key: Option<String>,
    /// The full decoded payload, forwarded to clients unmodified
    pub payload: Value,
}

/// A single broker message that could not be decoded
#[derive(Debug, Error)]
#[error("failed to decode message on channel '{channel}': {reason}")]
pub struct DecodeError {
    /// Channel the malformed message arrived on
    pub channel: String,
    /// Underlying parse error message
    pub reason: String,
}

/// Decode one raw broker message into a [`Notification`].
///
/// Only parseability is checked here; no schema validation is performed.
pub fn decode(channel: &str, raw: &[u8]) -> Result<Notification, DecodeError> {
    let payload: Value = serde_json::from_slice(raw).map_err(|e| DecodeError {
        channel: channel.to_string(),
        reason: e.to_string(),
    })?;

    let routing_key = payload
        .get(channels::ROUTING_KEY_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Notification {
        channel: channel.to_string(),
        routing_key,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_extracts_routing_key() {
        let raw = br#"{"channelId": "room42", "text": "hello"}"#;
        let notification = decode(channels::GROUP_MESSAGE_PERSISTED, raw).unwrap();

        assert_eq!(notification.channel, "group:message:persisted");
        assert_eq!(notification.routing_key.as_deref(), Some("room42"));
        assert_eq!(notification.payload["text"], json!("hello"));
    }

    #[test]
    fn test_decode_without_routing_key() {
        let raw = br#"{"text": "no address"}"#;
        let notification = decode(channels::MESSAGE_PERSISTED, raw).unwrap();
        assert!(notification.routing_key.is_none());
    }

    #[test]
    fn test_decode_non_string_routing_key_treated_absent() {
        let raw = br#"{"channelId": 7}"#;
        let notification = decode(channels::MESSAGE_PERSISTED, raw).unwrap();
        assert!(notification.routing_key.is_none());
    }

    #[test]
    fn test_decode_failure_carries_channel() {
        let err = decode(channels::MESSAGE_PERSISTED, b"{bad json").unwrap_err();
        assert_eq!(err.channel, "message:persisted");
        assert!(err.to_string().contains("message:persisted"));
    }

    #[test]
    fn test_payload_forwarded_unmodified() {
        let raw = br#"{"channelId":"c1","nested":{"a":[1,2,3]},"flag":true}"#;
        let notification = decode(channels::MESSAGE_PERSISTED, raw).unwrap();
        assert_eq!(
            notification.payload,
            json!({"channelId": "c1", "nested": {"a": [1, 2, 3]}, "flag": true})
        );
    }
}
