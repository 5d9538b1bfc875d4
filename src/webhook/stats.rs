//! Delivery counters for the status endpoint

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Server version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name from Cargo.toml
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

/// Health check response for liveness checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" if responding
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Receiver status with delivery counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
    /// Seconds since the receiver started
    pub uptime_seconds: u64,
    /// Deliveries accepted as JSON
    pub received: u64,
    /// Deliveries that passed validation
    pub valid: u64,
    /// Deliveries classified but failing validation
    pub invalid: u64,
    /// Bodies that were not JSON
    pub rejected: u64,
    /// Audit entries the event log refused
    pub log_failures: u64,
    /// ISO8601 time the status was generated
    pub timestamp: String,
}

/// Lock-free delivery counters
#[derive(Debug)]
pub struct WebhookStats {
    start_time: Instant,
    received: AtomicU64,
    valid: AtomicU64,
    invalid: AtomicU64,
    rejected: AtomicU64,
    log_failures: AtomicU64,
}

impl WebhookStats {
    /// Zeroed counters starting the uptime clock now
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            received: AtomicU64::new(0),
            valid: AtomicU64::new(0),
            invalid: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            log_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    /// Seconds since creation
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Count a classified delivery
    #[inline]
    pub fn record_delivery(&self, is_valid: bool) -> u64 {
        if is_valid {
            self.valid.fetch_add(1, Ordering::Relaxed);
        } else {
            self.invalid.fetch_add(1, Ordering::Relaxed);
        }
        self.received.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count a body that could not be parsed
    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[inline]
    /// Count an audit entry the log refused
    pub fn record_log_failure(&self) -> u64 {
        self.log_failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Deliveries accepted as JSON
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Deliveries that passed validation
    pub fn valid(&self) -> u64 {
        self.valid.load(Ordering::Relaxed)
    }

    /// Deliveries that failed validation
    pub fn invalid(&self) -> u64 {
        self.invalid.load(Ordering::Relaxed)
    }

    /// Bodies that were not JSON
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Audit entries the log refused
    pub fn log_failures(&self) -> u64 {
        self.log_failures.load(Ordering::Relaxed)
    }

    /// Snapshot for the status endpoint
    pub fn snapshot(&self) -> StatusResponse {
        StatusResponse {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
            uptime_seconds: self.uptime_seconds(),
            received: self.received(),
            valid: self.valid(),
            invalid: self.invalid(),
            rejected: self.rejected(),
            log_failures: self.log_failures(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl Default for WebhookStats {
    fn default() -> Self {
        Self::new()
    }
}
