//! Polling scheduler: selects runnable jobs and dispatches them to handlers.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::QueueConfig;
use crate::error::CoreError;
use crate::queue::{HandlerRegistry, JobQueue, RetryPolicy};

/// Handle to a running scheduler.
/// - `shutdown()` stops the poll loop and waits for it to exit.
/// - In-flight handlers are not cancelled; they run to completion and settle
///   their jobs on their own tasks.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Request shutdown without waiting.
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Stop polling and wait for the loop task to finish.
    pub async fn shutdown(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

/// The scheduler itself is just a spawned poll loop.
///
/// Each tick: sweep retention, count free concurrency slots, take runnable
/// candidates in priority/FIFO order, and dispatch each to its registered
/// handler on its own task. A job whose type has no registered handler fails
/// terminally (configuration error, no retry).
///
/// Known gaps, by design: no handler timeout (a hung handler occupies a slot
/// indefinitely) and no aging (a low-priority job can starve under a stream
/// of higher-priority arrivals).
pub struct Scheduler;

impl Scheduler {
    pub fn spawn(
        queue: Arc<JobQueue>,
        registry: Arc<HandlerRegistry>,
        policy: RetryPolicy,
        config: QueueConfig,
    ) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            info!(
                max_concurrency = config.max_concurrency,
                poll_interval_ms = config.poll_interval.as_millis() as u64,
                "job queue processing started"
            );
            let mut ticker = tokio::time::interval(config.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("job queue processing stopped");
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        tick(&queue, &registry, &policy, &config).await;
                    }
                }
            }
        });

        SchedulerHandle { shutdown_tx, join }
    }
}

async fn tick(
    queue: &Arc<JobQueue>,
    registry: &Arc<HandlerRegistry>,
    policy: &RetryPolicy,
    config: &QueueConfig,
) {
    if let Some(retention) = config.retention {
        queue.sweep_completed(retention).await;
    }

    let in_flight = queue.in_flight_len().await;
    if in_flight >= config.max_concurrency {
        return;
    }
    let free_slots = config.max_concurrency - in_flight;

    for (id, job_type) in queue.select_candidates(free_slots).await {
        let Some(handler) = registry.get(job_type) else {
            queue
                .mark_failed(id, CoreError::ProcessorNotFound(job_type).to_string())
                .await;
            continue;
        };

        // Claim re-checks eligibility under the lock; a `None` means the job
        // was raced away or went in flight since selection.
        let Some(job) = queue.claim(id).await else {
            debug!(job_id = %id, "candidate no longer claimable, skipping");
            continue;
        };

        let queue = Arc::clone(queue);
        let policy = policy.clone();
        tokio::spawn(async move {
            match handler.handle(&job).await {
                Ok(()) => queue.settle_success(job.id).await,
                Err(error) => {
                    queue.settle_failure(job.id, error.to_string(), &policy).await;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ContentKind, EmailKind, JobId, JobPayload, JobPriority, JobRecord, JobStatus,
    };
    use crate::queue::registry::JobHandler;
    use crate::queue::store::SubmitOptions;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    fn email_payload() -> JobPayload {
        JobPayload::EmailNotification {
            recipients: vec!["a@example.com".to_string()],
            subject: "hi".to_string(),
            content: "body".to_string(),
            kind: EmailKind::Notification,
        }
    }

    fn fast_config() -> QueueConfig {
        QueueConfig {
            poll_interval: Duration::from_millis(10),
            max_concurrency: 1,
            retention: None,
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(vec![Duration::from_millis(10)])
    }

    async fn wait_terminal(queue: &JobQueue, id: JobId, timeout: Duration) -> JobRecord {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let job = queue.get_job(id).await.expect("job exists");
            if job.status.is_terminal() {
                return job;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "job {id} did not reach a terminal state in time (status {:?})",
                job.status
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Records the order jobs are handed to it.
    struct RecordingHandler {
        seen: Mutex<Vec<JobId>>,
        hold: Duration,
    }

    #[async_trait]
    impl JobHandler for RecordingHandler {
        async fn handle(&self, job: &JobRecord) -> Result<(), CoreError> {
            self.seen.lock().await.push(job.id);
            tokio::time::sleep(self.hold).await;
            Ok(())
        }
    }

    /// Always fails.
    struct FailingHandler;

    #[async_trait]
    impl JobHandler for FailingHandler {
        async fn handle(&self, _job: &JobRecord) -> Result<(), CoreError> {
            Err(CoreError::handler("intentional failure"))
        }
    }

    /// Panics if it ever observes itself running twice concurrently.
    struct OverlapDetector {
        running: AtomicUsize,
        max_seen: AtomicUsize,
        hold: Duration,
    }

    #[async_trait]
    impl JobHandler for OverlapDetector {
        async fn handle(&self, _job: &JobRecord) -> Result<(), CoreError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.hold).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Err(CoreError::handler("fail so the job is re-dispatched"))
        }
    }

    #[tokio::test]
    async fn dispatch_order_follows_priority_with_one_slot() {
        let queue = Arc::new(JobQueue::new());
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
            hold: Duration::from_millis(20),
        });

        let submit = |priority| {
            let queue = queue.clone();
            async move {
                queue
                    .add_job(
                        email_payload(),
                        SubmitOptions {
                            priority,
                            ..SubmitOptions::default()
                        },
                    )
                    .await
            }
        };
        let low = submit(JobPriority::Low).await;
        let critical = submit(JobPriority::Critical).await;
        let normal = submit(JobPriority::Normal).await;
        let high = submit(JobPriority::High).await;

        let mut registry = HandlerRegistry::new();
        registry.register(crate::domain::JobType::EmailNotification, handler.clone());
        let scheduler = Scheduler::spawn(
            queue.clone(),
            Arc::new(registry),
            fast_policy(),
            fast_config(),
        );

        for id in [low, critical, normal, high] {
            let job = wait_terminal(&queue, id, Duration::from_secs(5)).await;
            assert_eq!(job.status, JobStatus::Completed);
        }
        scheduler.shutdown().await;

        let seen = handler.seen.lock().await.clone();
        assert_eq!(seen, vec![critical, high, normal, low]);
    }

    #[tokio::test]
    async fn failing_job_walks_retry_states_to_failed() {
        let queue = Arc::new(JobQueue::new());
        let mut registry = HandlerRegistry::new();
        registry.register(
            crate::domain::JobType::EmailNotification,
            Arc::new(FailingHandler),
        );

        let id = queue
            .add_job(
                email_payload(),
                SubmitOptions {
                    max_attempts: Some(3),
                    ..SubmitOptions::default()
                },
            )
            .await;

        let scheduler = Scheduler::spawn(
            queue.clone(),
            Arc::new(registry),
            fast_policy(),
            fast_config(),
        );
        let job = wait_terminal(&queue, id, Duration::from_secs(5)).await;
        scheduler.shutdown().await;

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.attempts, 3);
        assert_eq!(job.last_error.as_deref(), Some("intentional failure"));
    }

    #[tokio::test]
    async fn missing_processor_fails_terminally_without_an_attempt() {
        let queue = Arc::new(JobQueue::new());
        let registry = HandlerRegistry::new(); // nothing registered

        let id = queue
            .add_job(
                JobPayload::ContentProcessing {
                    content_id: "v1".to_string(),
                    content: ContentKind::Video,
                    operations: vec!["thumbnail".to_string()],
                },
                SubmitOptions::default(),
            )
            .await;

        let scheduler = Scheduler::spawn(
            queue.clone(),
            Arc::new(registry),
            fast_policy(),
            fast_config(),
        );
        let job = wait_terminal(&queue, id, Duration::from_secs(5)).await;
        scheduler.shutdown().await;

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.attempts, 0, "configuration errors consume no attempts");
        assert!(
            job.last_error.unwrap().contains("no processor registered"),
            "error names the configuration problem"
        );
    }

    #[tokio::test]
    async fn a_job_is_never_dispatched_twice_concurrently() {
        // Handler holds the job across several poll ticks while failing, so
        // overlapping ticks would double-dispatch without the in-flight set.
        let queue = Arc::new(JobQueue::new());
        let detector = Arc::new(OverlapDetector {
            running: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
            hold: Duration::from_millis(40),
        });
        let mut registry = HandlerRegistry::new();
        registry.register(crate::domain::JobType::EmailNotification, detector.clone());

        let id = queue
            .add_job(
                email_payload(),
                SubmitOptions {
                    max_attempts: Some(3),
                    ..SubmitOptions::default()
                },
            )
            .await;

        let config = QueueConfig {
            max_concurrency: 4,
            ..fast_config()
        };
        let scheduler = Scheduler::spawn(queue.clone(), Arc::new(registry), fast_policy(), config);
        wait_terminal(&queue, id, Duration::from_secs(5)).await;
        scheduler.shutdown().await;

        assert_eq!(detector.max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrency_cap_limits_in_flight_jobs() {
        let queue = Arc::new(JobQueue::new());
        let detector = Arc::new(OverlapDetector {
            running: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
            hold: Duration::from_millis(50),
        });
        let mut registry = HandlerRegistry::new();
        registry.register(crate::domain::JobType::EmailNotification, detector.clone());

        let mut ids = Vec::new();
        for _ in 0..6 {
            ids.push(
                queue
                    .add_job(
                        email_payload(),
                        SubmitOptions {
                            max_attempts: Some(1),
                            ..SubmitOptions::default()
                        },
                    )
                    .await,
            );
        }

        let config = QueueConfig {
            max_concurrency: 2,
            ..fast_config()
        };
        let scheduler = Scheduler::spawn(queue.clone(), Arc::new(registry), fast_policy(), config);
        for id in ids {
            wait_terminal(&queue, id, Duration::from_secs(5)).await;
        }
        scheduler.shutdown().await;

        assert!(detector.max_seen.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn shutdown_stops_dispatching() {
        let queue = Arc::new(JobQueue::new());
        let calls = Arc::new(AtomicU32::new(0));

        struct Counter(Arc<AtomicU32>);

        #[async_trait]
        impl JobHandler for Counter {
            async fn handle(&self, _job: &JobRecord) -> Result<(), CoreError> {
                self.0.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        }

        let mut registry = HandlerRegistry::new();
        registry.register(
            crate::domain::JobType::EmailNotification,
            Arc::new(Counter(calls.clone())),
        );
        let scheduler = Scheduler::spawn(
            queue.clone(),
            Arc::new(registry),
            fast_policy(),
            fast_config(),
        );
        scheduler.shutdown().await;

        let id = queue.add_job(email_payload(), SubmitOptions::default()).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(calls.load(Ordering::Relaxed), 0);
        let job = queue.get_job(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn retention_sweep_runs_inside_the_poll() {
        let queue = Arc::new(JobQueue::new());
        let mut registry = HandlerRegistry::new();
        registry.register(
            crate::domain::JobType::EmailNotification,
            Arc::new(RecordingHandler {
                seen: Mutex::new(Vec::new()),
                hold: Duration::ZERO,
            }),
        );

        let config = QueueConfig {
            retention: Some(Duration::from_millis(30)),
            ..fast_config()
        };
        let scheduler = Scheduler::spawn(queue.clone(), Arc::new(registry), fast_policy(), config);

        let id = queue.add_job(email_payload(), SubmitOptions::default()).await;
        wait_terminal(&queue, id, Duration::from_secs(5)).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        scheduler.shutdown().await;

        assert!(queue.get_job(id).await.is_none(), "swept after retention");
    }
}
