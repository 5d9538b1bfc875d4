//! MemberPress Webhooks - event classification for MemberPress sites
//!
//! This crate receives MemberPress lifecycle webhooks (signups, renewals,
//! upgrades, refunds, ...), classifies them into one of 44 event kinds and
//! validates their shape, and reads member subscription data over the
//! MemberPress REST API.
//!
//! # Features
//!
//! - **Event classification**: table-driven taxonomy with one generic event type
//! - **Entity wrappers**: typed, defensive views over members, memberships,
//!   subscriptions and transactions
//! - **Webhook receiver**: axum router acknowledging and auditing deliveries
//! - **REST client**: cached member lookups and subscription checks
//!
//! # Architecture
//!
//! ```text
//! MemberPress ──▶ webhook ──▶ events::classify ──▶ MemberpressEvent
//!                                   │                    │
//!                                   ▼                    ▼
//!                              EventKind table     entities (lazy)
//!                                   │
//!                                   ▼
//!                             schema registry
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use memberpress_webhooks::events::{classify, EventKind};
//! use serde_json::json;
//!
//! let event = classify(json!({"event": "login", "type": "member", "data": {}}));
//! assert_eq!(event.kind(), EventKind::Login);
//! // an empty `data` lacks the member fields
//! assert!(!event.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// MemberPress REST client
pub mod client;
/// Environment configuration
pub mod config;
/// Entity wrappers
pub mod entities;
/// Error types
pub mod error;
/// Event classification and validation
pub mod events;
/// Log redaction
pub mod redact;
/// Required-key schemas
pub mod schema;
/// HTTP webhook receiver
pub mod webhook;

// Re-exports for convenience
pub use client::MemberpressClient;
pub use config::MemberpressConfig;
pub use entities::{Entity, Member, Membership, Subscription, Transaction};
pub use error::{Error, Result};
pub use events::{classify, classify_slice, EventKind, MemberpressEvent, ValidationError};
pub use schema::{EntityKind, Schema};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
