//! Error types for the MemberPress bridge
//!
//! This module provides the error hierarchy used by the configuration layer,
//! the REST client and the webhook transport. Event classification itself
//! never returns these: a malformed delivery degrades to an invalid event
//! (see [`crate::events::ValidationError`]).

use thiserror::Error;

/// The main error type for MemberPress bridge operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// REST client errors
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Webhook transport errors
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Environment variable name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The MemberPress base URL is not an absolute URL
    #[error("Invalid MemberPress base URL: {0}")]
    InvalidBaseUrl(String),

    /// An API key is required for this operation but none was configured
    #[error("MEMBERPRESS_API_KEY environment variable not set")]
    MissingApiKey,
}

/// MemberPress REST API errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("HTTP error {status} from {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The response body was not the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// No member matched the requested username
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// Username is empty or otherwise unusable
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    /// Endpoint URL could not be built
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Webhook transport errors
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Body is not JSON at all
    #[error("Malformed webhook body: {0}")]
    MalformedBody(String),
}

/// Result type alias for MemberPress bridge operations
pub type Result<T> = std::result::Result<T, Error>;
