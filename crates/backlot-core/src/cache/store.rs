//! In-memory TTL cache store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::config::CacheConfig;
use crate::observability::CacheStats;

/// One cached value. Entries are replaced wholesale by a later `set`, never
/// mutated in place.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
    ttl: Duration,

    /// Insertion sequence number, the eviction tie-break ("oldest" means
    /// first-inserted-still-present). Overwriting a key keeps its sequence.
    seq: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) > self.ttl
    }
}

/// Bounded key-value store with per-entry expiration and hit/miss counters.
///
/// Design:
/// - Expired entries are evicted lazily on `get` and eagerly by the sweep
///   that runs when an insert finds the store full.
/// - All operations are total; capacity pressure is resolved by eviction,
///   never surfaced as an error.
/// - Not internally synchronized: the manager holds it behind a lock.
pub struct MemoryStore {
    entries: HashMap<String, CacheEntry>,
    max_size: usize,
    default_ttl: Duration,
    next_seq: u64,
    hits: u64,
    misses: u64,
}

impl MemoryStore {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            max_size: config.max_size,
            default_ttl: config.default_ttl,
            next_seq: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Insert or replace. When the store is full: sweep expired entries
    /// first, and if that is not enough, evict the oldest surviving entry.
    pub fn set(&mut self, key: &str, value: Value, ttl: Option<Duration>) {
        if self.entries.len() >= self.max_size {
            self.cleanup();
        }
        if self.entries.len() >= self.max_size && !self.entries.contains_key(key) {
            self.evict_oldest();
        }

        let seq = match self.entries.get(key) {
            Some(existing) => existing.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl: ttl.unwrap_or(self.default_ttl),
                seq,
            },
        );
    }

    /// Look up a key. Expired entries are deleted on sight and count as a
    /// miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = Instant::now();
        match self.entries.get(key) {
            None => {
                self.misses += 1;
                None
            }
            Some(entry) if entry.is_expired(now) => {
                self.entries.remove(key);
                self.misses += 1;
                None
            }
            Some(entry) => {
                self.hits += 1;
                Some(entry.value.clone())
            }
        }
    }

    /// Remove a key; returns whether something was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Empty the store and reset all counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Counter snapshot; no side effects.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }

    /// Sweep all expired entries.
    fn cleanup(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }

    /// Evict the entry with the lowest insertion sequence still present.
    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.seq)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
