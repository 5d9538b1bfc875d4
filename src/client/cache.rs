//! Member response cache
//!
//! The client stores raw member JSON under `get_member:<username>` for the
//! configured TTL. Any key-value store can back it by implementing
//! [`MemberCache`]; [`InMemoryMemberCache`] is the default.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

/// Cache key of a member lookup
pub fn member_cache_key(username: &str) -> String {
    format!("get_member:{username}")
}

/// Key-value cache for member responses
#[async_trait::async_trait]
pub trait MemberCache: Send + Sync + 'static {
    /// Fetch a live entry
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store an entry for `ttl`
    async fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Drop an entry
    async fn remove(&self, key: &str);
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

/// Process-local cache with per-entry expiry
#[derive(Debug, Default)]
pub struct InMemoryMemberCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryMemberCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until they are
    /// next read or overwritten
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove every expired entry and return how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }
}

#[async_trait::async_trait]
impl MemberCache for InMemoryMemberCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => {
                    debug!(key, "Member cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write();
        // another writer may have refreshed the entry between the two locks
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                debug!(key, "Member cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            expires_at: now.checked_add(ttl),
        };
        let mut entries = self.entries.write();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(key.to_string(), entry);
    }

    async fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}
