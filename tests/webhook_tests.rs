//! Webhook receiver tests
//!
//! These tests drive the axum router in-process with `tower::ServiceExt`.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use memberpress_webhooks::config::MemberpressConfig;
use memberpress_webhooks::events::{EventKind, EventLogEntry};
use memberpress_webhooks::redact::REDACTED;
use memberpress_webhooks::webhook::{
    router, AppState, EventLog, HealthResponse, InMemoryEventLog, JsonLinesEventLog,
    StatusResponse, WebhookAck,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::complete_payload;

fn app() -> (Router, Arc<AppState>, Arc<InMemoryEventLog>) {
    let log = Arc::new(InMemoryEventLog::new(8));
    let state = Arc::new(AppState::new(
        log.clone(),
        MemberpressConfig::test_config().sensitive_keys,
    ));
    (router(state.clone()), state, log)
}

fn post_webhook(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook/")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::REFERER, "https://stepwisemath.ai/")
        .body(body.into())
        .unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_valid_delivery_is_acknowledged_and_logged() {
    let (app, state, log) = app();
    let payload = complete_payload(EventKind::SubscriptionCreated);

    let response = app
        .oneshot(post_webhook(serde_json::to_vec(&payload).unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ack: WebhookAck = json_body(response).await;
    assert_eq!(ack.event, "subscription-created");
    assert!(ack.is_valid);

    let entries = log.recent(10).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id.to_string(), ack.id);
    assert_eq!(entries[0].sender.as_deref(), Some("https://stepwisemath.ai/"));
    assert_eq!(entries[0].payload, payload);

    assert_eq!(state.stats().received(), 1);
    assert_eq!(state.stats().valid(), 1);
}

#[tokio::test]
async fn test_invalid_delivery_is_still_acknowledged() {
    let (app, state, log) = app();
    let body = json!({"event": "transaction-completed", "type": "transaction", "data": {}});

    let response = app
        .oneshot(post_webhook(body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ack: WebhookAck = json_body(response).await;
    assert_eq!(ack.event, "transaction-completed");
    assert!(!ack.is_valid);

    assert_eq!(log.len(), 1);
    assert_eq!(state.stats().invalid(), 1);
}

#[tokio::test]
async fn test_unknown_event_is_logged_as_unidentified() {
    let (app, _state, log) = app();
    let body = json!({"event": "coupon-applied", "type": "coupon", "data": {"code": "SAVE10"}});

    let response = app.oneshot(post_webhook(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entries = log.recent(1).await;
    assert_eq!(entries[0].event, "unidentified-event");
    assert_eq!(entries[0].payload["event"], json!("coupon-applied"));
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let (app, state, log) = app();

    let response = app
        .oneshot(post_webhook("event=login&type=member"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Malformed webhook body"));
    assert!(log.is_empty());
    assert_eq!(state.stats().rejected(), 1);
    assert_eq!(state.stats().received(), 0);
}

#[tokio::test]
async fn test_event_log_endpoint_redacts_payloads() {
    let (app, _state, log) = app();
    let payload = json!({"event": "login", "type": "member", "token": "abc", "data": {}});
    let entry = memberpress_webhooks::events::classify(payload).log_entry(None);
    log.record(entry).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhook/log?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entries: Vec<EventLogEntry> = json_body(response).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].payload["token"], json!(REDACTED));
    assert_eq!(entries[0].payload["event"], json!("login"));

    // the stored entry keeps the original value
    assert_eq!(log.recent(1).await[0].payload["token"], json!("abc"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state, _log) = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = json_body(response).await;
    assert_eq!(health, HealthResponse::default());
}

#[tokio::test]
async fn test_status_endpoint_counts_deliveries() {
    let (app, _state, _log) = app();

    for kind in [EventKind::Login, EventKind::MemberAdded] {
        let response = app
            .clone()
            .oneshot(post_webhook(complete_payload(kind).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app
        .clone()
        .oneshot(post_webhook("not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status: StatusResponse = json_body(response).await;
    assert_eq!(status.received, 2);
    assert_eq!(status.valid, 2);
    assert_eq!(status.invalid, 0);
    assert_eq!(status.rejected, 1);
    assert_eq!(status.name, "memberpress-webhooks");
}

#[tokio::test]
async fn test_get_on_webhook_route_is_not_allowed() {
    let (app, _state, _log) = app();
    let response = app
        .oneshot(Request::builder().uri("/webhook/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_event_log_failure_still_acknowledges() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(JsonLinesEventLog::new(dir.path().join("missing").join("events.jsonl")));
    let state = Arc::new(AppState::new(log, MemberpressConfig::test_config().sensitive_keys));
    let app = router(state.clone());

    let response = app
        .oneshot(post_webhook(complete_payload(EventKind::Login).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ack: WebhookAck = json_body(response).await;
    assert!(ack.is_valid);
    assert_eq!(state.stats().received(), 1);
    assert_eq!(state.stats().log_failures(), 1);
}

#[tokio::test]
async fn test_file_event_log_serves_recent_entries() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(JsonLinesEventLog::new(dir.path().join("events.jsonl")));
    let state = Arc::new(AppState::new(log, MemberpressConfig::test_config().sensitive_keys));
    let app = router(state);

    let mut payload = complete_payload(EventKind::MemberAdded);
    payload["password"] = json!("hunter2");
    let response = app
        .clone()
        .oneshot(post_webhook(payload.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/webhook/log").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let entries: Vec<EventLogEntry> = json_body(response).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event, "member-added");
    assert_eq!(entries[0].payload["password"], json!(REDACTED));
}
