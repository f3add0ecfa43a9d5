//! Message Routes
//!
//! Accepts client-submitted message payloads, gates them through the payload
//! validator, and publishes accepted payloads onto the persisted-message
//! broker channels. Validation failures return the full accumulated error
//! list verbatim.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::relay::channels;
use crate::validation::{self, validate_message_payload};

/// Response for an accepted message
#[derive(Serialize)]
pub struct PublishResponse {
    pub status: String,
    /// Broker channel the notification was published to
    pub channel: String,
}

/// POST /api/v1/messages
///
/// Validates the payload and publishes it as a persisted-message
/// notification. Group-addressed payloads (carrying `groupId`) go to the
/// group channel, everything else to the direct-message channel.
pub async fn publish_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<PublishResponse>)> {
    let result = validate_message_payload(&payload);
    if !result.is_valid {
        return Err(ApiError::Validation(result.errors));
    }

    let publisher = state
        .publisher
        .as_ref()
        .ok_or_else(|| ApiError::BrokerUnavailable("no broker configured".to_string()))?;

    let channel = target_channel(&payload);

    publisher.publish(channel, &payload).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            status: "accepted".to_string(),
            channel: channel.to_string(),
        }),
    ))
}

/// Pick the broker channel for an accepted payload.
///
/// Uses the same presence rule as the validator, so a null or empty
/// `groupId` addresses the direct-message channel.
fn target_channel(payload: &Value) -> &'static str {
    if validation::is_present(payload.get("groupId")) {
        channels::GROUP_MESSAGE_PERSISTED
    } else {
        channels::MESSAGE_PERSISTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_id_selects_group_channel() {
        let payload = json!({"content": "hi", "groupId": "g1"});
        assert_eq!(target_channel(&payload), channels::GROUP_MESSAGE_PERSISTED);
    }

    #[test]
    fn test_channel_id_selects_message_channel() {
        let payload = json!({"content": "hi", "channelId": "c1"});
        assert_eq!(target_channel(&payload), channels::MESSAGE_PERSISTED);
    }

    #[test]
    fn test_empty_group_id_selects_message_channel() {
        let payload = json!({"content": "hi", "channelId": "c1", "groupId": ""});
        assert_eq!(target_channel(&payload), channels::MESSAGE_PERSISTED);
    }

    #[test]
    fn test_null_group_id_selects_message_channel() {
        let payload = json!({"content": "hi", "channelId": "c1", "groupId": null});
        assert_eq!(target_channel(&payload), channels::MESSAGE_PERSISTED);
    }
}
