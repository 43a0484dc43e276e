use serde::{Deserialize, Serialize};

/// Snapshot of queue occupancy by status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub retrying: usize,
    pub completed: usize,
    pub failed: usize,

    /// Jobs currently occupying a concurrency slot.
    pub in_flight: usize,
}

/// Snapshot of cache counters. `hits` and `misses` are monotone; `size`
/// tracks the current entry count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}
