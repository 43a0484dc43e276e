//! Construction-time configuration for the cache and the job queue.
//!
//! Both structs are passed in explicitly at build time; there is no
//! environment sniffing inside the core. `production()` presets carry the
//! values used when the platform runs for real.

use std::time::Duration;

/// Configuration for the in-memory cache store.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction kicks in.
    pub max_size: usize,

    /// TTL applied when `set` is called without an explicit one.
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            default_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// Configuration for the job queue scheduler.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// How often the scheduler polls for runnable jobs.
    pub poll_interval: Duration,

    /// Global cap on in-flight jobs (not per job type).
    pub max_concurrency: usize,

    /// How long completed jobs are kept before the retention sweep drops
    /// them. `None` keeps them for the process lifetime (development).
    pub retention: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_concurrency: 3,
            retention: None,
        }
    }
}

impl QueueConfig {
    /// Production preset: higher concurrency, completed jobs kept 5 minutes.
    pub fn production() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_concurrency: 10,
            retention: Some(Duration::from_secs(5 * 60)),
        }
    }
}
