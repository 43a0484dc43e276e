//! Tiered cache: in-memory TTL store + optional distributed tier.

pub mod keys;
pub mod manager;
pub mod store;

pub use manager::{CacheManager, TierOutcome};
pub use store::MemoryStore;

/// TTL presets used throughout the platform.
pub mod ttl {
    use std::time::Duration;

    pub const SHORT: Duration = Duration::from_secs(60);
    pub const MEDIUM: Duration = Duration::from_secs(5 * 60);
    pub const LONG: Duration = Duration::from_secs(30 * 60);
    pub const VERY_LONG: Duration = Duration::from_secs(2 * 60 * 60);
}
