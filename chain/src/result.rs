//! Tagged decodings of the two union-shaped chain responses.
//!
//! The home anchor reports message processing as `{"Ok": …}` or
//! `{"Error": {"message": …}}`; the appchain's notification history stores
//! the JSON string `"Success"` or an arbitrary failure value. Both shapes
//! are parsed here by named functions instead of being inspected ad hoc at
//! the call sites.

use crate::ChainError;
use serde_json::Value;

/// Outcome of a cross-chain message as reported by the home anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageResult {
    /// The message was processed successfully.
    Ok,
    /// The message was processed and rejected; `message` is the chain's
    /// human-readable reason.
    Error { message: String },
}

/// Parse the anchor's `message_processing_result` view payload.
///
/// The caller handles absence (the chain has not processed the message yet);
/// this function only sees a present result and fails loudly on any shape
/// it does not recognize.
pub fn parse_message_result(value: &Value) -> Result<MessageResult, ChainError> {
    let obj = value.as_object().ok_or_else(|| {
        ChainError::InvalidResponse(format!("message result is not an object: {value}"))
    })?;

    if obj.contains_key("Ok") {
        return Ok(MessageResult::Ok);
    }
    if let Some(err) = obj.get("Error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ChainError::InvalidResponse(format!("error result without message: {value}"))
            })?
            .to_string();
        return Ok(MessageResult::Error { message });
    }
    Err(ChainError::InvalidResponse(format!(
        "message result is neither Ok nor Error: {value}"
    )))
}

/// Outcome of a home→appchain notification as stored by the appchain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationOutcome {
    Delivered,
    /// Any non-`"Success"` value; rendered verbatim as the failure message.
    Failed(String),
}

/// Parse a `notification_history` storage value.
///
/// `null` means the appchain has not recorded an outcome yet and maps to
/// `None` — still pending, not an error.
pub fn parse_notification(value: &Value) -> Option<NotificationOutcome> {
    match value {
        Value::Null => None,
        Value::String(s) if s == "Success" => Some(NotificationOutcome::Delivered),
        Value::String(s) => Some(NotificationOutcome::Failed(s.clone())),
        other => Some(NotificationOutcome::Failed(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_shape_parses() {
        let value = json!({"Ok": {"nonce": 12}});
        assert_eq!(parse_message_result(&value).unwrap(), MessageResult::Ok);
    }

    #[test]
    fn error_shape_carries_message() {
        let value = json!({"Error": {"message": "Insufficient balance"}});
        assert_eq!(
            parse_message_result(&value).unwrap(),
            MessageResult::Error {
                message: "Insufficient balance".into()
            }
        );
    }

    #[test]
    fn unknown_shapes_fail_loudly() {
        assert!(parse_message_result(&json!("Ok")).is_err());
        assert!(parse_message_result(&json!({"Pending": true})).is_err());
        assert!(parse_message_result(&json!({"Error": {}})).is_err());
    }

    #[test]
    fn success_string_is_delivered() {
        assert_eq!(
            parse_notification(&json!("Success")),
            Some(NotificationOutcome::Delivered)
        );
    }

    #[test]
    fn other_values_are_failures() {
        assert_eq!(
            parse_notification(&json!("TokenMintFailed")),
            Some(NotificationOutcome::Failed("TokenMintFailed".into()))
        );
        assert_eq!(
            parse_notification(&json!({"module": 4, "error": 2})),
            Some(NotificationOutcome::Failed(
                "{\"error\":2,\"module\":4}".into()
            ))
        );
    }

    #[test]
    fn null_is_still_pending() {
        assert_eq!(parse_notification(&Value::Null), None);
    }
}
