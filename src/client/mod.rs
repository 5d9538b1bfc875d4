//! MemberPress REST client
//!
//! Reads member records from the MemberPress developer-tools REST API
//! (`/wp-json/mp/v1/members`) and answers whether a member currently holds an
//! active subscription. Responses are cached per username.
//!
//! ```text
//! get_member(username) ──▶ MemberCache ──hit──▶ Member
//!                              │
//!                             miss
//!                              ▼
//!              GET <base>/wp-json/mp/v1/members?search=<username>
//!                              │
//!                              ▼
//!                 exact username match ──▶ cache.set ──▶ Member
//! ```

/// Member response caching
pub mod cache;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::MemberpressConfig;
use crate::entities::{Entity, Member};
use crate::error::{ClientError, Result};
use crate::redact;

pub use cache::{member_cache_key, InMemoryMemberCache, MemberCache};

/// Path of the members collection, relative to the site root
pub const MEMBERS_PATH: &str = "wp-json/mp/v1/members";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the MemberPress REST API
#[derive(Clone)]
pub struct MemberpressClient {
    http: reqwest::Client,
    config: Arc<MemberpressConfig>,
    cache: Arc<dyn MemberCache>,
}

impl std::fmt::Debug for MemberpressClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberpressClient")
            .field("base_url", &self.config.api_base_url.as_str())
            .field("api_key_name", &self.config.api_key_name)
            .finish_non_exhaustive()
    }
}

impl MemberpressClient {
    /// Create a client backed by an in-memory cache
    pub fn new(config: MemberpressConfig) -> Result<Self> {
        Self::with_cache(config, Arc::new(InMemoryMemberCache::new()))
    }

    /// Create a client backed by the given cache
    pub fn with_cache(config: MemberpressConfig, cache: Arc<dyn MemberCache>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(config),
            cache,
        })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &MemberpressConfig {
        &self.config
    }

    /// URL of the member search for `username`
    pub fn members_url(&self, username: &str) -> Result<Url> {
        let mut url = self
            .config
            .api_base_url
            .join(MEMBERS_PATH)
            .map_err(ClientError::InvalidUrl)?;
        url.query_pairs_mut().append_pair("search", username);
        Ok(url)
    }

    /// Fetch a member by username, from cache when possible
    ///
    /// # Errors
    ///
    /// - `ClientError::InvalidUsername` for an empty username
    /// - `ConfigError::MissingApiKey` on a cache miss without an API key
    /// - `ClientError::HttpStatus` / `ClientError::Request` on transport failure
    /// - `ClientError::MemberNotFound` when no member has exactly this username
    #[instrument(skip(self), fields(base_url = %self.config.api_base_url))]
    pub async fn get_member(&self, username: &str) -> Result<Member> {
        let username = validate_username(username)?;
        let cache_key = member_cache_key(username);

        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!(key = %cache_key, "Serving member from cache");
            return Ok(Member::from_value(&cached));
        }

        let member = self.fetch_member(username).await?;
        self.cache
            .set(&cache_key, member.clone(), self.config.cache_expiration)
            .await;
        Ok(Member::from_value(&member))
    }

    /// True when `username` is a complete member record with an active
    /// recent subscription
    ///
    /// Every failure is logged and answered with `false`.
    #[instrument(skip(self))]
    pub async fn is_active_subscription(&self, username: &str) -> bool {
        let username = username.trim();
        let member = match self.get_member(username).await {
            Ok(member) => member,
            Err(e) => {
                warn!(error = %e, "Cannot read member");
                return false;
            }
        };

        if !member.is_complete() {
            let response = redact::masked(
                &Value::Object(member.fields().clone()),
                &self.config.sensitive_keys,
            );
            warn!(
                missing = ?member.missing_keys(),
                response = %response,
                "get_member() returned an incomplete member"
            );
            return false;
        }

        if member.username() != Some(username) {
            warn!(
                received = ?member.username(),
                "Requested one username but received another"
            );
            return false;
        }

        let active = member.is_active_subscription();
        info!(active, "Checked subscription status");
        active
    }

    /// Drop the cached record of `username`
    pub async fn forget_member(&self, username: &str) {
        self.cache.remove(&member_cache_key(username.trim())).await;
    }

    async fn fetch_member(&self, username: &str) -> Result<Value> {
        let api_key = self.config.require_api_key()?;
        let url = self.members_url(username)?;
        debug!(url = %url, "Requesting member");

        let response = self
            .http
            .get(url.clone())
            .header(self.config.api_key_name.as_str(), api_key)
            .send()
            .await
            .map_err(ClientError::Request)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let body: Value = response.json().await.map_err(ClientError::Request)?;
        Ok(select_member(body, username)?)
    }
}

fn validate_username(username: &str) -> std::result::Result<&str, ClientError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        warn!("Received request with an empty username");
        return Err(ClientError::InvalidUsername(username.to_string()));
    }
    Ok(trimmed)
}

/// Pick the member whose username matches exactly
///
/// The search endpoint matches substrings of several fields, so a list of
/// candidates comes back; a single object is accepted as well.
pub fn select_member(body: Value, username: &str) -> std::result::Result<Value, ClientError> {
    let candidates = match body {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected a list of members, received {}",
                crate::entities::json_type_name(&other)
            )))
        }
    };

    candidates
        .into_iter()
        .find(|candidate| candidate.get("username").and_then(Value::as_str) == Some(username))
        .ok_or_else(|| ClientError::MemberNotFound(username.to_string()))
}
