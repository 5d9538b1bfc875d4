//! Event factory

use serde_json::Value;
use tracing::instrument;

use super::event::MemberpressEvent;
use super::kind::EventKind;
use crate::error::{Result, WebhookError};

/// Classify and validate a webhook payload
///
/// Never fails: an absent, non-string or unknown `event` name yields an
/// [`EventKind::Unidentified`] event, and structural problems only mark the
/// event invalid.
pub fn classify(payload: Value) -> MemberpressEvent {
    let kind = payload
        .get("event")
        .and_then(Value::as_str)
        .map(EventKind::from_name)
        .unwrap_or(EventKind::Unidentified);

    MemberpressEvent::new(kind, payload)
}

/// Parse raw bytes as JSON and classify them
///
/// Fails only when the body is not JSON.
#[instrument(level = "debug", skip(body), fields(len = body.len()))]
pub fn classify_slice(body: &[u8]) -> Result<MemberpressEvent> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| WebhookError::MalformedBody(e.to_string()))?;
    Ok(classify(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_classify_known_name() {
        let event = classify(json!({"event": "subscription-paused", "type": "subscription", "data": {}}));
        assert_eq!(event.kind(), EventKind::SubscriptionPaused);
        assert!(!event.is_valid());
    }

    #[test]
    fn test_classify_fallbacks() {
        assert_eq!(classify(json!({"type": "member"})).kind(), EventKind::Unidentified);
        assert_eq!(classify(json!({"event": 42})).kind(), EventKind::Unidentified);
        assert_eq!(classify(json!({"event": "coupon-applied"})).kind(), EventKind::Unidentified);
        assert_eq!(classify(json!("login")).kind(), EventKind::Unidentified);
        assert_eq!(classify(Value::Null).kind(), EventKind::Unidentified);
    }

    #[test]
    fn test_classify_slice() {
        let event = classify_slice(br#"{"event": "member-deleted", "type": "member", "data": {}}"#).unwrap();
        assert_eq!(event.kind(), EventKind::MemberDeleted);

        let err = classify_slice(b"event=login").unwrap_err();
        assert!(matches!(err, Error::Webhook(WebhookError::MalformedBody(_))));
    }
}
