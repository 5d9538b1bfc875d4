//! Webhook receiver
//!
//! ```text
//! MemberPress ──POST /webhook/──▶ classify_slice ──▶ MemberpressEvent
//!                                                        │
//!                                      ┌─────────────────┼──────────────┐
//!                                      ▼                 ▼              ▼
//!                                WebhookStats       EventLog        200 OK
//! ```

/// Router and handlers
pub mod handler;
/// Delivery audit log
pub mod log;
/// Delivery counters
pub mod stats;

pub use handler::{router, sender_from_headers, AppState, WebhookAck, WebhookRejection};
pub use log::{EventLog, InMemoryEventLog, JsonLinesEventLog};
pub use stats::{HealthResponse, StatusResponse, WebhookStats};
