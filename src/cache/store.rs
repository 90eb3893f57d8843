//! Cache storage.
//!
//! Serialized JSON payloads in a concurrent map with lazy TTL expiry.
//! A periodic sweep (spawned at startup) drops entries whose deadline
//! passed without being read.

use std::time::Instant;

use bytes::Bytes;
use dashmap::DashMap;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::plan::InvalidationPlan;

struct CacheEntry {
    payload: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-process read-through cache for serialized response payloads.
///
/// Best-effort by contract: a miss, an expired entry, or a payload that no
/// longer deserializes all degrade to a repository round-trip, never to an
/// error.
pub struct ResponseCache {
    config: CacheConfig,
    entries: DashMap<CacheKey, CacheEntry>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Fetch and deserialize a cached payload, dropping it when expired.
    pub fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.config.enabled {
            return None;
        }

        // Clone out of the shard guard before any removal; removing while
        // the read guard is alive would deadlock the shard.
        let entry_state = self.entries.get(key).map(|entry| {
            if entry.is_expired(Instant::now()) {
                None
            } else {
                Some(entry.payload.clone())
            }
        });

        let payload = match entry_state {
            Some(Some(payload)) => payload,
            Some(None) => {
                self.entries.remove(key);
                counter!("mensa_cache_expired_total").increment(1);
                counter!("mensa_cache_miss_total").increment(1);
                return None;
            }
            None => {
                counter!("mensa_cache_miss_total").increment(1);
                return None;
            }
        };

        match serde_json::from_slice(&payload) {
            Ok(value) => {
                counter!("mensa_cache_hit_total").increment(1);
                Some(value)
            }
            Err(err) => {
                debug!(
                    target = "mensa::cache",
                    family = key.family(),
                    error = %err,
                    "cached payload no longer deserializes, dropping"
                );
                self.entries.remove(key);
                counter!("mensa_cache_miss_total").increment(1);
                None
            }
        }
    }

    /// Serialize and store a payload under the configured TTL.
    pub fn put_json<T: Serialize>(&self, key: CacheKey, value: &T) {
        if !self.config.enabled {
            return;
        }

        let payload = match serde_json::to_vec(value) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                debug!(
                    target = "mensa::cache",
                    family = key.family(),
                    error = %err,
                    "payload failed to serialize, skipping cache population"
                );
                return;
            }
        };

        self.entries.insert(
            key,
            CacheEntry {
                payload,
                expires_at: Instant::now() + self.config.ttl(),
            },
        );
    }

    pub fn remove(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    /// Apply a declarative invalidation plan produced for a mutation.
    pub fn apply(&self, plan: &InvalidationPlan) {
        for key in plan.keys() {
            self.entries.remove(key);
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            counter!("mensa_cache_expired_total").increment(removed as u64);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
