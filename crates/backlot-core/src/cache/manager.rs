//! Tiered cache manager.
//!
//! Composes the local TTL store with an optional distributed tier:
//! write-through on `set`, read-through with local backfill on `get`. The
//! remote tier is best-effort by contract; its outcomes are classified as a
//! [`TierOutcome`] and logged at this boundary, never raised to callers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::store::MemoryStore;
use crate::config::CacheConfig;
use crate::error::CoreError;
use crate::observability::CacheStats;
use crate::ports::RemoteCache;

/// What happened at the remote tier for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    Hit,
    Miss,
    Applied,
    /// No remote tier configured; the operation stayed local.
    Skipped,
    /// The tier failed; the caller was served from the local tier only.
    Degraded,
}

/// Tiered cache over one local store and zero-or-one remote tier.
pub struct CacheManager {
    local: Mutex<MemoryStore>,
    remote: Option<Arc<dyn RemoteCache>>,
}

impl CacheManager {
    pub fn new(config: CacheConfig, remote: Option<Arc<dyn RemoteCache>>) -> Self {
        Self {
            local: Mutex::new(MemoryStore::new(config)),
            remote,
        }
    }

    /// Local-only manager with default configuration.
    pub fn local_only() -> Self {
        Self::new(CacheConfig::default(), None)
    }

    /// Write to the local store, then write-through to the remote tier.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(error) => {
                warn!(key, %error, "cache set skipped: value not serializable");
                return;
            }
        };

        self.local.lock().await.set(key, json.clone(), ttl);
        let outcome = self.remote_set(key, &json, ttl).await;
        self.tier_event("set", key, outcome);
    }

    /// Local store first; on a local miss, read through the remote tier and
    /// backfill the local store (at the default TTL, not the original one).
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if let Some(json) = self.local.lock().await.get(key) {
            return decode(key, json);
        }

        let (json, outcome) = self.remote_get(key).await;
        self.tier_event("get", key, outcome);
        let json = json?;
        self.local.lock().await.set(key, json.clone(), None);
        decode(key, json)
    }

    /// Remove from both tiers; returns whether the local tier had the key.
    pub async fn delete(&self, key: &str) -> bool {
        let deleted = self.local.lock().await.delete(key);
        let outcome = match &self.remote {
            None => TierOutcome::Skipped,
            Some(remote) => match remote.delete(key).await {
                Ok(_) => TierOutcome::Applied,
                Err(error) => {
                    warn!(key, %error, "remote cache delete failed");
                    TierOutcome::Degraded
                }
            },
        };
        self.tier_event("delete", key, outcome);
        deleted
    }

    /// Empty both tiers and reset local counters.
    pub async fn clear(&self) {
        self.local.lock().await.clear();
        let outcome = match &self.remote {
            None => TierOutcome::Skipped,
            Some(remote) => match remote.clear().await {
                Ok(()) => TierOutcome::Applied,
                Err(error) => {
                    warn!(%error, "remote cache clear failed");
                    TierOutcome::Degraded
                }
            },
        };
        self.tier_event("clear", "*", outcome);
    }

    /// Get-or-populate: return the cached value, or run `producer`, cache its
    /// result under `key`, and return it.
    ///
    /// Concurrent callers populating the same key are NOT deduplicated: each
    /// one runs `producer` independently and the last write wins.
    pub async fn with_cache<T, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> Result<T, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        let value = producer().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    /// Counter snapshot of the local tier.
    pub async fn stats(&self) -> CacheStats {
        self.local.lock().await.stats()
    }

    async fn remote_set(&self, key: &str, json: &Value, ttl: Option<Duration>) -> TierOutcome {
        let Some(remote) = &self.remote else {
            return TierOutcome::Skipped;
        };
        let ttl_seconds = ttl.map(|d| d.as_secs());
        match remote.set(key, &json.to_string(), ttl_seconds).await {
            Ok(()) => TierOutcome::Applied,
            Err(error) => {
                warn!(key, %error, "remote cache set failed");
                TierOutcome::Degraded
            }
        }
    }

    async fn remote_get(&self, key: &str) -> (Option<Value>, TierOutcome) {
        let Some(remote) = &self.remote else {
            return (None, TierOutcome::Skipped);
        };
        match remote.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(json) => (Some(json), TierOutcome::Hit),
                Err(error) => {
                    warn!(key, %error, "remote cache returned unparseable value");
                    (None, TierOutcome::Degraded)
                }
            },
            Ok(None) => (None, TierOutcome::Miss),
            Err(error) => {
                warn!(key, %error, "remote cache get failed");
                (None, TierOutcome::Degraded)
            }
        }
    }

    fn tier_event(&self, op: &'static str, key: &str, outcome: TierOutcome) {
        if outcome != TierOutcome::Skipped {
            debug!(op, key, ?outcome, "remote cache tier");
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, json: Value) -> Option<T> {
    match serde_json::from_value(json) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "cached value failed to decode; treating as absent");
            None
        }
    }
}
