//! Bulk upload processors: materialize creator-submitted videos/blogs as
//! DRAFT content rows.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{JobPayload, JobRecord};
use crate::error::CoreError;
use crate::ports::{BlogDraft, ContentStore, PublishState, StoreError, VideoDraft};
use crate::queue::JobHandler;

const VIDEO_BATCH_SIZE: usize = 5;
const VIDEO_BATCH_PAUSE: Duration = Duration::from_millis(100);

// Smaller batches for blogs due to larger content.
const BLOG_BATCH_SIZE: usize = 3;
const BLOG_BATCH_PAUSE: Duration = Duration::from_millis(200);

const EXCERPT_LEN: usize = 200;

/// Creates one DRAFT video row per entry, batched to avoid overwhelming the
/// store. Re-runs after a retry rely on duplicate-key collisions being
/// swallowed per item.
pub struct BulkVideoUploadProcessor {
    store: Arc<dyn ContentStore>,
}

impl BulkVideoUploadProcessor {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl JobHandler for BulkVideoUploadProcessor {
    async fn handle(&self, job: &JobRecord) -> Result<(), CoreError> {
        let JobPayload::BulkVideoUpload { videos, creator_id } = &job.payload else {
            return Err(CoreError::handler(format!(
                "unexpected payload for bulk-video-upload: {}",
                job.payload.job_type()
            )));
        };

        info!(
            job_id = %job.id,
            video_count = videos.len(),
            creator_id,
            "processing bulk video upload"
        );

        for batch in videos.chunks(VIDEO_BATCH_SIZE) {
            for video in batch {
                let draft = VideoDraft {
                    title: video.title.clone(),
                    youtube_id: video.youtube_id.clone(),
                    youtube_url: format!(
                        "https://www.youtube.com/watch?v={}",
                        video.youtube_id
                    ),
                    description: video.description.clone(),
                    creator_id: creator_id.clone(),
                    status: PublishState::Draft,
                };
                if let Err(error) = self.store.create_video(draft).await {
                    skip_or_abort(job, &video.youtube_id, error)?;
                }
            }
            tokio::time::sleep(VIDEO_BATCH_PAUSE).await;
        }
        Ok(())
    }
}

/// Creates one DRAFT blog row per entry; a missing excerpt defaults to the
/// leading part of the content.
pub struct BulkBlogUploadProcessor {
    store: Arc<dyn ContentStore>,
}

impl BulkBlogUploadProcessor {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl JobHandler for BulkBlogUploadProcessor {
    async fn handle(&self, job: &JobRecord) -> Result<(), CoreError> {
        let JobPayload::BulkBlogUpload { blogs, creator_id } = &job.payload else {
            return Err(CoreError::handler(format!(
                "unexpected payload for bulk-blog-upload: {}",
                job.payload.job_type()
            )));
        };

        info!(
            job_id = %job.id,
            blog_count = blogs.len(),
            creator_id,
            "processing bulk blog upload"
        );

        for batch in blogs.chunks(BLOG_BATCH_SIZE) {
            for blog in batch {
                let draft = BlogDraft {
                    title: blog.title.clone(),
                    content: blog.content.clone(),
                    excerpt: blog
                        .excerpt
                        .clone()
                        .unwrap_or_else(|| truncated(&blog.content, EXCERPT_LEN)),
                    creator_id: creator_id.clone(),
                    status: PublishState::Draft,
                };
                if let Err(error) = self.store.create_blog(draft).await {
                    skip_or_abort(job, &blog.title, error)?;
                }
            }
            tokio::time::sleep(BLOG_BATCH_PAUSE).await;
        }
        Ok(())
    }
}

/// Per-item errors are logged and skipped; an unavailable store aborts the
/// whole handler so the job is retried.
fn skip_or_abort(job: &JobRecord, item: &str, error: StoreError) -> Result<(), CoreError> {
    if error.is_per_item() {
        warn!(job_id = %job.id, item, %error, "skipping item in bulk upload");
        Ok(())
    } else {
        Err(CoreError::Store(error))
    }
}

fn truncated(content: &str, max_len: usize) -> String {
    match content.char_indices().nth(max_len) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content.to_string(),
    }
}
