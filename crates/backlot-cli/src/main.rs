//! Demo walkthrough for the backlot background core.
//!
//! Wires an `App` against an in-memory content store, overrides the email
//! processor with one that fails twice (to show retry/backoff), submits a
//! bulk video upload and an email job, and polls both to a terminal state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backlot_core::domain::{EmailKind, JobId, JobPayload, JobType, VideoEntry};
use backlot_core::ports::{BlogDraft, ContentStore, StoreError, VideoDraft};
use backlot_core::queue::{JobHandler, RetryPolicy, SubmitOptions};
use backlot_core::{App, AppBuilder, CoreError, JobPriority, QueueConfig};

/// In-memory stand-in for the platform database.
#[derive(Default)]
struct MemoryContentStore {
    videos: Mutex<Vec<VideoDraft>>,
    blogs: Mutex<Vec<BlogDraft>>,
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn create_video(&self, draft: VideoDraft) -> Result<(), StoreError> {
        let mut videos = self.videos.lock().await;
        if videos.iter().any(|v| v.youtube_id == draft.youtube_id) {
            return Err(StoreError::Duplicate(draft.youtube_id));
        }
        videos.push(draft);
        Ok(())
    }

    async fn create_blog(&self, draft: BlogDraft) -> Result<(), StoreError> {
        self.blogs.lock().await.push(draft);
        Ok(())
    }
}

/// Email handler that fails its first `n` invocations, then succeeds.
struct FlakyEmailHandler {
    remaining_failures: AtomicU32,
}

impl FlakyEmailHandler {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl JobHandler for FlakyEmailHandler {
    async fn handle(&self, job: &backlot_core::JobRecord) -> Result<(), CoreError> {
        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(CoreError::handler(format!(
                "intentional failure (left={left})"
            )));
        }
        info!(job_id = %job.id, "email sent on attempt {}", job.attempts);
        Ok(())
    }
}

async fn wait_terminal(app: &App, id: JobId) {
    loop {
        let job = app.queue.get_job(id).await.expect("job exists");
        if job.status.is_terminal() {
            println!(
                "final: id={id} type={} status={:?} attempts={} last_error={:?}",
                job.job_type(),
                job.status,
                job.attempts,
                job.last_error
            );
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let store = Arc::new(MemoryContentStore::default());
    let app = AppBuilder::new()
        .queue_config(QueueConfig {
            poll_interval: Duration::from_millis(200),
            ..QueueConfig::default()
        })
        // Short delays so the retry walk is visible without waiting a minute.
        .retry_policy(RetryPolicy::new(vec![
            Duration::from_millis(500),
            Duration::from_secs(1),
        ]))
        .content_store(store.clone())
        .register(
            JobType::EmailNotification,
            Arc::new(FlakyEmailHandler::new(2)),
        )
        .build();

    // The cache memoizes an "expensive" lookup.
    let trending: Vec<String> = app
        .cache
        .with_cache("videos:trending", Some(Duration::from_secs(60)), || async {
            Ok(vec!["yt0".to_string(), "yt1".to_string()])
        })
        .await
        .expect("producer cannot fail here");
    println!("trending (computed): {trending:?}");
    let trending: Option<Vec<String>> = app.cache.get("videos:trending").await;
    println!("trending (cached):   {trending:?}");
    println!("cache stats: {:?}", app.cache.stats().await);

    // A bulk upload lands as DRAFT rows in the store.
    let upload = app
        .queue
        .add_job(
            JobPayload::BulkVideoUpload {
                videos: (0..5)
                    .map(|n| VideoEntry {
                        title: format!("Video {n}"),
                        youtube_id: format!("yt{n}"),
                        description: None,
                    })
                    .collect(),
                creator_id: "c1".to_string(),
            },
            SubmitOptions {
                priority: JobPriority::High,
                max_attempts: Some(5),
                submitted_by: Some("c1".to_string()),
            },
        )
        .await;

    // The flaky email job fails twice, retries with backoff, then succeeds.
    let email = app
        .queue
        .add_job(
            JobPayload::EmailNotification {
                recipients: vec!["creator@example.com".to_string()],
                subject: "Your upload finished".to_string(),
                content: "All five videos are drafted.".to_string(),
                kind: EmailKind::Notification,
            },
            SubmitOptions {
                max_attempts: Some(5),
                ..SubmitOptions::default()
            },
        )
        .await;

    wait_terminal(&app, upload).await;
    wait_terminal(&app, email).await;

    println!("queue stats: {:?}", app.queue.stats().await);
    println!("videos drafted: {}", store.videos.lock().await.len());

    app.shutdown().await;
}
