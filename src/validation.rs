//! Payload Validation
//!
//! Pure validation rules applied to client-submitted payloads before they are
//! accepted for persistence or relay. Rules accumulate all violations rather
//! than short-circuiting, so callers can surface every problem at once.

use serde_json::Value;

/// Maximum allowed message content length, in characters (inclusive).
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Fields that can address a message to a conversation.
const ADDRESSING_FIELDS: [&str; 3] = ["channelId", "receiverId", "groupId"];

/// Outcome of validating a payload
///
/// `is_valid` is true iff `errors` is empty. Pure value, discarded by the
/// caller after use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the payload passed all rules
    pub is_valid: bool,
    /// All accumulated rule violations, in rule order
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a message payload before it enters the persistence/relay pipeline.
///
/// Rules, in order:
/// 1. A null/absent payload fails immediately with "Payload is required".
/// 2. `content` must be non-empty after trimming whitespace.
/// 3. `content` must not exceed [`MAX_CONTENT_LENGTH`] characters (boundary
///    inclusive: exactly 10,000 is accepted).
/// 4. At least one of `channelId`, `receiverId`, `groupId` must be present.
pub fn validate_message_payload(payload: &Value) -> ValidationResult {
    if payload.is_null() {
        return ValidationResult::from_errors(vec!["Payload is required".to_string()]);
    }

    let mut errors = Vec::new();

    let content = payload.get("content").and_then(Value::as_str);
    match content {
        Some(text) if !text.trim().is_empty() => {
            if text.chars().count() > MAX_CONTENT_LENGTH {
                errors.push(format!(
                    "Message content too long (max {} characters)",
                    MAX_CONTENT_LENGTH
                ));
            }
        }
        _ => errors.push("Message content cannot be empty".to_string()),
    }

    let addressed = ADDRESSING_FIELDS
        .iter()
        .any(|field| is_present(payload.get(*field)));
    if !addressed {
        errors.push("Either channelId, receiverId, or groupId is required".to_string());
    }

    ValidationResult::from_errors(errors)
}

/// Validate a group action payload (join/leave): `groupId` must be present.
pub fn validate_group_action(payload: &Value) -> ValidationResult {
    if is_present(payload.get("groupId")) {
        ValidationResult::from_errors(Vec::new())
    } else {
        ValidationResult::from_errors(vec!["groupId is required".to_string()])
    }
}

/// A field counts as present when it exists, is not null, and is not an
/// empty string.
pub(crate) fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
