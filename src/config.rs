//! Settings for the MemberPress bridge
//!
//! All settings come from environment variables; nothing secret is
//! hardcoded.
//!
//! - `MEMBERPRESS_API_KEY`: REST API key (optional; required only by the client)
//! - `MEMBERPRESS_API_KEY_NAME`: header carrying the key (default: `MEMBERPRESS-API-KEY`)
//! - `MEMBERPRESS_API_BASE_URL`: WordPress site root (default: `https://set-me-please.com/`)
//! - `MEMBERPRESS_CACHE_EXPIRATION`: member cache TTL in seconds (default: 300)
//! - `MEMBERPRESS_SENSITIVE_KEYS`: comma separated keys masked in logs
//! - `MEMBERPRESS_EVENT_LOG_CAPACITY`: audit entries kept in memory (default: 1000)

use std::env;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::error::ConfigError;

/// Default header name for the MemberPress developer-tools API key
pub const DEFAULT_API_KEY_NAME: &str = "MEMBERPRESS-API-KEY";

/// Placeholder site used until a real one is configured
pub const DEFAULT_API_BASE_URL: &str = "https://set-me-please.com/";

/// Default member cache TTL in seconds
pub const DEFAULT_CACHE_EXPIRATION_SECS: u64 = 300;

/// Default number of audit entries kept in memory
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1000;

/// Keys masked by [`crate::redact::masked`] unless overridden
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "token",
    "client_id",
    "client_secret",
    "Authorization",
    "secret",
];

/// Bridge configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct MemberpressConfig {
    /// REST API key, when configured
    pub api_key: Option<String>,
    /// Header name the key is sent in
    pub api_key_name: String,
    /// WordPress site root
    pub api_base_url: Url,
    /// How long a fetched member stays cached
    pub cache_expiration: Duration,
    /// Keys masked before payloads are logged
    pub sensitive_keys: Vec<String>,
    /// Audit entries kept by the in-memory event log
    pub event_log_capacity: usize,
}

impl MemberpressConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if `MEMBERPRESS_API_BASE_URL` is
    /// not an absolute URL, and `ConfigError::InvalidValue` for unparseable
    /// numeric settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("MEMBERPRESS_API_KEY").filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("MEMBERPRESS_API_KEY is not set; REST client calls will be refused");
        }

        let api_key_name = lookup("MEMBERPRESS_API_KEY_NAME")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY_NAME.to_string());

        let raw_base_url =
            lookup("MEMBERPRESS_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = parse_base_url(&raw_base_url)?;

        let cache_expiration = match lookup("MEMBERPRESS_CACHE_EXPIRATION") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue {
                    name: "MEMBERPRESS_CACHE_EXPIRATION",
                    reason: e.to_string(),
                }
            })?),
            None => Duration::from_secs(DEFAULT_CACHE_EXPIRATION_SECS),
        };

        let sensitive_keys = match lookup("MEMBERPRESS_SENSITIVE_KEYS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect(),
            None => default_sensitive_keys(),
        };

        let event_log_capacity = match lookup("MEMBERPRESS_EVENT_LOG_CAPACITY") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                name: "MEMBERPRESS_EVENT_LOG_CAPACITY",
                reason: e.to_string(),
            })?,
            None => DEFAULT_EVENT_LOG_CAPACITY,
        };
        if event_log_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MEMBERPRESS_EVENT_LOG_CAPACITY",
                reason: "capacity cannot be 0".to_string(),
            });
        }

        if api_base_url.as_str() == DEFAULT_API_BASE_URL {
            warn!("MEMBERPRESS_API_BASE_URL is not set; using placeholder {DEFAULT_API_BASE_URL}");
        }
        info!(
            base_url = %api_base_url,
            cache_secs = cache_expiration.as_secs(),
            "MemberPress configuration loaded"
        );

        Ok(Self {
            api_key,
            api_key_name,
            api_base_url,
            cache_expiration,
            sensitive_keys,
            event_log_capacity,
        })
    }

    /// Configuration for tests: a fake key and a local base URL
    pub fn test_config() -> Self {
        Self {
            api_key: Some("test-key-for-unit-tests-only".to_string()),
            api_key_name: DEFAULT_API_KEY_NAME.to_string(),
            api_base_url: Url::parse("http://127.0.0.1:9/").expect("test URL is valid"),
            cache_expiration: Duration::from_secs(DEFAULT_CACHE_EXPIRATION_SECS),
            sensitive_keys: default_sensitive_keys(),
            event_log_capacity: 16,
        }
    }

    /// The API key, or an error if none is configured
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

impl Default for MemberpressConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_name: DEFAULT_API_KEY_NAME.to_string(),
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default base URL is valid"),
            cache_expiration: Duration::from_secs(DEFAULT_CACHE_EXPIRATION_SECS),
            sensitive_keys: default_sensitive_keys(),
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
        }
    }
}

fn default_sensitive_keys() -> Vec<String> {
    DEFAULT_SENSITIVE_KEYS.iter().map(|k| k.to_string()).collect()
}

/// Parse the site root, forcing a trailing slash so relative joins keep the path
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| ConfigError::InvalidBaseUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidBaseUrl(format!(
            "{raw}: unsupported scheme {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MemberpressConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, MemberpressConfig::default());
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_key_name, "MEMBERPRESS-API-KEY");
        assert_eq!(config.api_base_url.as_str(), "https://set-me-please.com/");
        assert_eq!(config.cache_expiration, Duration::from_secs(300));
        assert_eq!(config.sensitive_keys.len(), 6);
        assert!(matches!(config.require_api_key(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_overrides() {
        let config = MemberpressConfig::from_lookup(lookup(&[
            ("MEMBERPRESS_API_KEY", "abc123"),
            ("MEMBERPRESS_API_KEY_NAME", "X-MP-KEY"),
            ("MEMBERPRESS_API_BASE_URL", "https://stepwisemath.ai/blog"),
            ("MEMBERPRESS_CACHE_EXPIRATION", "60"),
            ("MEMBERPRESS_SENSITIVE_KEYS", "password, api_key,,"),
            ("MEMBERPRESS_EVENT_LOG_CAPACITY", "5"),
        ]))
        .unwrap();

        assert_eq!(config.require_api_key().unwrap(), "abc123");
        assert_eq!(config.api_key_name, "X-MP-KEY");
        assert_eq!(config.api_base_url.as_str(), "https://stepwisemath.ai/blog/");
        assert_eq!(config.cache_expiration, Duration::from_secs(60));
        assert_eq!(config.sensitive_keys, vec!["password", "api_key"]);
        assert_eq!(config.event_log_capacity, 5);
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = MemberpressConfig::from_lookup(lookup(&[("MEMBERPRESS_API_KEY", "  ")])).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_invalid_values() {
        let err = MemberpressConfig::from_lookup(lookup(&[("MEMBERPRESS_CACHE_EXPIRATION", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: "MEMBERPRESS_CACHE_EXPIRATION", .. }
        ));

        let err = MemberpressConfig::from_lookup(lookup(&[("MEMBERPRESS_API_BASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));

        let err = MemberpressConfig::from_lookup(lookup(&[("MEMBERPRESS_API_BASE_URL", "ftp://files.example.com")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));

        let err = MemberpressConfig::from_lookup(lookup(&[("MEMBERPRESS_EVENT_LOG_CAPACITY", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_huge_cache_expiration_is_accepted() {
        let config = MemberpressConfig::from_lookup(lookup(&[(
            "MEMBERPRESS_CACHE_EXPIRATION",
            "18446744073709551615",
        )]))
        .unwrap();
        assert_eq!(config.cache_expiration, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_test_config() {
        let config = MemberpressConfig::test_config();
        assert!(config.require_api_key().is_ok());
        assert_eq!(config.api_base_url.host_str(), Some("127.0.0.1"));
    }
}
