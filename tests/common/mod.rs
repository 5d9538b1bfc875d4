//! Shared webhook fixtures for the integration tests

#![allow(dead_code)]

use memberpress_webhooks::events::EventKind;
use memberpress_webhooks::schema::EntityKind;
use serde_json::{json, Map, Value};

/// Member object as MemberPress sends it in webhook payloads
pub fn member_data() -> Value {
    json!({
        "id": "6",
        "email": "lpm0073@gmail.com",
        "username": "mcdaniel",
        "nicename": "mcdaniel",
        "url": "https://lawrencemcdaniel.com",
        "message": "",
        "registered_at": "2022-10-04 00:46:37",
        "first_name": "Lawrence",
        "last_name": "McDaniel",
        "display_name": "Lawrence McDaniel",
        "active_memberships": [{"id": 245, "title": "StepwiseMath Monthly", "status": "publish"}],
        "active_txn_count": "1",
        "expired_txn_count": "0",
        "trial_txn_count": "0",
        "sub_count": "1",
        "login_count": "7",
        "first_txn": {"id": "31", "status": "complete"},
        "latest_txn": {"id": "31", "status": "complete"},
        "address": {"mepr-address-city": "Austin"},
        "profile": {},
        "recent_transactions": [{"id": "31", "status": "complete"}],
        "recent_subscriptions": [{"id": "12", "status": "active"}]
    })
}

pub fn membership_data() -> Value {
    json!({
        "id": 245,
        "title": "StepwiseMath Monthly",
        "status": "publish",
        "price": "19.95",
        "period": "1",
        "period_type": "months"
    })
}

pub fn subscription_data() -> Value {
    json!({
        "id": "12",
        "subscr_id": "sub_1LwZ",
        "gateway": "stripe",
        "status": "active",
        "price": "19.95",
        "created_at": "2022-10-07 22:21:58"
    })
}

/// `data` object carrying every key the kind requires
pub fn complete_data(kind: EventKind) -> Map<String, Value> {
    let primary = match kind.event_type() {
        Some(EntityKind::Member) => member_data(),
        _ => Value::Object(Map::new()),
    };
    let mut data = match primary {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for key in kind.schema().keys() {
        if data.contains_key(*key) {
            continue;
        }
        let value = match *key {
            "member" => member_data(),
            "membership" => membership_data(),
            "subscription" => subscription_data(),
            "id" => json!("31"),
            "status" => json!("complete"),
            "created_at" | "expires_at" => json!("2022-10-07 22:21:58"),
            _ => Value::Null,
        };
        data.insert(key.to_string(), value);
    }
    data
}

/// Complete, valid payload for `kind`
pub fn complete_payload(kind: EventKind) -> Value {
    json!({
        "event": kind.as_str(),
        "type": kind.type_name(),
        "data": Value::Object(complete_data(kind)),
    })
}
