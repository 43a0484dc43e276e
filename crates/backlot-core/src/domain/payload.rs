//! Typed job payloads.
//!
//! Each job kind carries its own payload shape as a variant of a tagged
//! union, so handlers never cast an opaque blob. The serialized tag names are
//! the platform's wire names (`bulk-video-upload`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The set of known job kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    BulkVideoUpload,
    BulkBlogUpload,
    ContentProcessing,
    #[serde(rename = "email-notifications")]
    EmailNotification,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::BulkVideoUpload => "bulk-video-upload",
            JobType::BulkBlogUpload => "bulk-blog-upload",
            JobType::ContentProcessing => "content-processing",
            JobType::EmailNotification => "email-notifications",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One video row in a bulk upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    pub title: String,
    pub youtube_id: String,
    pub description: Option<String>,
}

/// One blog row in a bulk upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogEntry {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
}

/// Which content table a processing job targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Blog,
}

/// Classification used by the email processor for routing/logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailKind {
    Notification,
    Marketing,
    System,
}

/// Job payload: one strongly-typed variant per job kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum JobPayload {
    BulkVideoUpload {
        videos: Vec<VideoEntry>,
        creator_id: String,
    },
    BulkBlogUpload {
        blogs: Vec<BlogEntry>,
        creator_id: String,
    },
    ContentProcessing {
        content_id: String,
        content: ContentKind,
        operations: Vec<String>,
    },
    #[serde(rename = "email-notifications")]
    EmailNotification {
        recipients: Vec<String>,
        subject: String,
        content: String,
        kind: EmailKind,
    },
}

impl JobPayload {
    /// The job kind this payload belongs to (the registry key).
    pub fn job_type(&self) -> JobType {
        match self {
            JobPayload::BulkVideoUpload { .. } => JobType::BulkVideoUpload,
            JobPayload::BulkBlogUpload { .. } => JobType::BulkBlogUpload,
            JobPayload::ContentProcessing { .. } => JobType::ContentProcessing,
            JobPayload::EmailNotification { .. } => JobType::EmailNotification,
        }
    }
}
