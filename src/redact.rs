//! Log redaction
//!
//! Payloads and request headers are masked before they reach a log line.

use serde_json::Value;

/// Replacement for every sensitive value
pub const REDACTED: &str = "*** -- REDACTED -- ***";

/// Copy of `value` with every sensitive top-level key masked
///
/// Non-object values are returned unchanged; `null` becomes an empty object
/// so it logs the same way an empty payload does.
pub fn masked<S: AsRef<str>>(value: &Value, sensitive_keys: &[S]) -> Value {
    match value {
        Value::Object(map) => {
            let mut map = map.clone();
            for key in sensitive_keys {
                if let Some(slot) = map.get_mut(key.as_ref()) {
                    *slot = Value::String(REDACTED.to_string());
                }
            }
            Value::Object(map)
        }
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    }
}

/// Header value safe to log: sensitive names are masked
pub fn masked_header<'a, S: AsRef<str>>(name: &str, value: &'a str, sensitive_keys: &[S]) -> &'a str {
    if sensitive_keys
        .iter()
        .any(|key| key.as_ref().eq_ignore_ascii_case(name))
    {
        REDACTED
    } else {
        value
    }
}
