//! Distributed cache collaborator (optional second tier).
//!
//! Values cross this boundary as JSON strings; TTLs as whole seconds. The
//! tier is best-effort by contract: the manager logs failures and degrades to
//! local-only, it never surfaces them to callers.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteCacheError {
    /// The backing service is unreachable.
    #[error("remote cache unavailable: {0}")]
    Unavailable(String),

    /// The service answered but the operation failed.
    #[error("remote cache backend: {0}")]
    Backend(String),
}

/// Distributed cache port. Absence of a configured implementation is a valid
/// deployment; only distribution is lost, not correctness.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RemoteCacheError>;

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<(), RemoteCacheError>;

    async fn delete(&self, key: &str) -> Result<bool, RemoteCacheError>;

    async fn clear(&self) -> Result<(), RemoteCacheError>;
}
