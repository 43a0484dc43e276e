//! Persistence collaborator used by the bulk-upload processors.
//!
//! Duplicate-key and constraint violations are distinct variants so callers
//! can swallow them per item and keep going; `Unavailable` is the one that
//! should abort a handler and trigger a retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same unique key already exists.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// Some other constraint was violated (foreign key, check, ...).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The store itself is unreachable or failing.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Per-item errors the bulk processors log and skip.
    pub fn is_per_item(&self) -> bool {
        matches!(self, StoreError::Duplicate(_) | StoreError::Constraint(_))
    }
}

/// Publication state of created content. Bulk uploads always land as drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishState {
    Draft,
    Published,
}

/// A video row to materialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDraft {
    pub title: String,
    pub youtube_id: String,
    pub youtube_url: String,
    pub description: Option<String>,
    pub creator_id: String,
    pub status: PublishState,
}

/// A blog row to materialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub creator_id: String,
    pub status: PublishState,
}

/// Persistence port consumed by job processors.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_video(&self, draft: VideoDraft) -> Result<(), StoreError>;

    async fn create_blog(&self, draft: BlogDraft) -> Result<(), StoreError>;
}
