//! Defensive field coercion
//!
//! MemberPress is loose about JSON types: ids and counts arrive as numbers or
//! numeric strings, flags as booleans or `"true"`, timestamps in two
//! different layouts. These helpers read one field from an object and never
//! fail; anything unusable becomes `None`.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

/// Layout of `registered_at` in member responses, e.g. `10/04/22 00:46:37`
pub const MEMBER_DATETIME_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// Layout of transaction and subscription timestamps
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-only fallback layout
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// MySQL zero date, sent for timestamps that were never set (lifetime
/// expiries, pending transactions)
pub const ZERO_DATETIME: &str = "0000-00-00 00:00:00";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .expect("email pattern is valid")
    })
}

/// String value, `None` when absent or not a string
pub fn string<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

/// Integer value from a JSON number or a numeric string
pub fn integer(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Count-like integer, `0` when unreadable
pub fn count(fields: &Map<String, Value>, key: &str) -> i64 {
    integer(fields, key).unwrap_or(0)
}

/// Decimal value such as a price or a tax amount
pub fn amount(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Flag value: JSON `true` or the string "true" in any case
pub fn flag(fields: &Map<String, Value>, key: &str) -> bool {
    match fields.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Timestamp in `YYYY-MM-DD HH:MM:SS`, falling back to `YYYY-MM-DD`
pub fn datetime(fields: &Map<String, Value>, key: &str) -> Option<NaiveDateTime> {
    let raw = fields.get(key)?.as_str()?;
    if is_unset_datetime(raw) {
        return None;
    }
    let parsed = parse_iso_datetime(raw);
    if parsed.is_none() {
        warn!(field = key, value = raw, "Cannot convert datetime string");
    }
    parsed
}

/// Member registration timestamp in `MM/DD/YY HH:MM:SS`
///
/// The webhook and `/me` payloads send ISO timestamps for the same field, so
/// the ISO layouts are tried once the two-digit-year layout fails.
pub fn member_datetime(fields: &Map<String, Value>, key: &str) -> Option<NaiveDateTime> {
    let raw = fields.get(key)?.as_str()?;
    if is_unset_datetime(raw) {
        return None;
    }
    let parsed = NaiveDateTime::parse_from_str(raw.trim(), MEMBER_DATETIME_FORMAT)
        .ok()
        .or_else(|| parse_iso_datetime(raw));
    if parsed.is_none() {
        warn!(field = key, value = raw, "Cannot read member timestamp");
    }
    parsed
}

/// True for the zero date or a date-only zero
pub fn is_unset_datetime(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw.starts_with(&ZERO_DATETIME[..10])
}

/// Parse the ISO-like layouts used by transactions and subscriptions
pub fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    // only the first 19 characters carry the timestamp; MemberPress sometimes
    // appends fractional seconds or an offset
    let head = raw.get(..19).unwrap_or(raw);
    NaiveDateTime::parse_from_str(head, DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(head, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Syntactically valid email address, `None` otherwise
pub fn email<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    let raw = string(fields, key)?;
    if is_valid_email(raw) {
        Some(raw)
    } else {
        warn!(field = key, "Invalid email address");
        None
    }
}

/// Absolute http(s) URL with a host, `None` otherwise
pub fn url(fields: &Map<String, Value>, key: &str) -> Option<Url> {
    let raw = string(fields, key)?;
    parse_web_url(raw)
}

/// Syntactic email check, no deliverability lookup
pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && email_regex().is_match(value)
}

/// Parse an absolute http(s) URL that names a host
pub fn parse_web_url(value: &str) -> Option<Url> {
    let parsed = Url::parse(value.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some_and(|h| !h.is_empty()) => Some(parsed),
        _ => None,
    }
}

/// Nested JSON object
pub fn object<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    fields.get(key).and_then(Value::as_object)
}

/// Array of JSON objects; non-object elements are skipped
pub fn objects<'a>(fields: &'a Map<String, Value>, key: &str) -> Vec<&'a Map<String, Value>> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

/// Id of a reference field that holds either a scalar id or an object with `id`
pub fn reference_id(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    match fields.get(key)? {
        Value::Object(inner) => integer(inner, "id"),
        _ => integer(fields, key),
    }
}
