//! HTTP handlers for the webhook receiver
//!
//! - `POST /webhook/` classifies a delivery, records it and acknowledges it
//! - `GET /webhook/log` lists recent audit entries with payloads redacted
//! - `GET /health` answers liveness checks
//! - `GET /status` reports delivery counters
//!
//! A delivery is acknowledged with `200 OK` whether or not it validates;
//! invalid deliveries are only visible in logs and counters. Only a body
//! that is not JSON at all is refused with `400 Bad Request`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use super::log::{EventLog, InMemoryEventLog};
use super::stats::{HealthResponse, WebhookStats};
use crate::config::MemberpressConfig;
use crate::events::{classify_slice, EventLogEntry};
use crate::redact;

const DEFAULT_LOG_LIMIT: usize = 50;

/// Shared receiver state
pub struct AppState {
    stats: WebhookStats,
    event_log: Arc<dyn EventLog>,
    sensitive_keys: Vec<String>,
}

impl AppState {
    /// State recording into `event_log`, masking `sensitive_keys` in logs
    pub fn new(event_log: Arc<dyn EventLog>, sensitive_keys: Vec<String>) -> Self {
        Self {
            stats: WebhookStats::new(),
            event_log,
            sensitive_keys,
        }
    }

    /// State with an in-memory log sized from the configuration
    pub fn from_config(config: &MemberpressConfig) -> Self {
        Self::new(
            Arc::new(InMemoryEventLog::new(config.event_log_capacity)),
            config.sensitive_keys.clone(),
        )
    }

    /// Delivery counters
    pub fn stats(&self) -> &WebhookStats {
        &self.stats
    }

    /// Audit log sink
    pub fn event_log(&self) -> &Arc<dyn EventLog> {
        &self.event_log
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("stats", &self.stats)
            .field("sensitive_keys", &self.sensitive_keys)
            .finish_non_exhaustive()
    }
}

/// Body returned for every classified delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookAck {
    /// Classified event name
    pub event: String,
    /// Whether the delivery passed validation
    pub is_valid: bool,
    /// Audit entry id
    pub id: String,
}

/// Body returned for a refused delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookRejection {
    /// Why the body was refused
    pub error: String,
}

#[derive(Debug, Deserialize)]
/// Query string of `GET /webhook/log`
pub struct LogQuery {
    /// Maximum entries to return
    pub limit: Option<usize>,
}

/// Build the receiver router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook/", post(webhook_handler))
        .route("/webhook/log", get(event_log_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Sending site, from `Referer` or else `Origin`
pub fn sender_from_headers(headers: &HeaderMap) -> Option<String> {
    [header::REFERER, header::ORIGIN]
        .iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Request headers as `name: value` pairs, sensitive values masked
fn loggable_headers(headers: &HeaderMap, sensitive_keys: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<binary>");
            format!(
                "{name}: {}",
                redact::masked_header(name.as_str(), value, sensitive_keys)
            )
        })
        .collect()
}

/// Webhook endpoint handler
///
/// # Route
/// `POST /webhook/`
///
/// # Response
/// - `200 OK` with a [`WebhookAck`] for any JSON body
/// - `400 Bad Request` with a [`WebhookRejection`] otherwise
#[instrument(skip_all, fields(len = body.len()))]
pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let sender = sender_from_headers(&headers);
    debug!(
        headers = ?loggable_headers(&headers, &state.sensitive_keys),
        "Webhook request headers"
    );

    let event = match classify_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            state.stats.record_rejected();
            warn!(sender = ?sender, error = %e, "Rejected webhook delivery");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookRejection {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    state.stats.record_delivery(event.is_valid());
    debug!(
        payload = %redact::masked(event.payload(), &state.sensitive_keys),
        "Webhook payload"
    );

    let entry = event.log_entry(sender.clone());
    let ack = WebhookAck {
        event: entry.event.clone(),
        is_valid: entry.is_valid,
        id: entry.id.to_string(),
    };

    if let Err(e) = state.event_log.record(entry).await {
        state.stats.record_log_failure();
        warn!(error = %e, "Could not record webhook delivery");
    }

    info!(
        event = %event.event(),
        received = ?event.received_event_name(),
        sender = ?sender,
        is_valid = event.is_valid(),
        "Received MemberPress webhook"
    );

    (StatusCode::OK, Json(ack)).into_response()
}

/// Recent audit entries, newest first, with sensitive keys masked
///
/// # Route
/// `GET /webhook/log?limit=N`
#[instrument(skip_all)]
pub async fn event_log_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> Json<Vec<EventLogEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let entries = state
        .event_log
        .recent(limit)
        .await
        .into_iter()
        .map(|mut entry| {
            entry.payload = redact::masked(&entry.payload, &state.sensitive_keys);
            entry
        })
        .collect();
    Json(entries)
}

/// Health check endpoint handler
///
/// # Route
/// `GET /health`
#[instrument(skip_all)]
pub async fn health_handler() -> impl IntoResponse {
    debug!("Health check requested");
    (StatusCode::OK, Json(HealthResponse::default()))
}

/// Status endpoint handler
///
/// # Route
/// `GET /status`
#[instrument(skip_all)]
pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.stats.snapshot()))
}
