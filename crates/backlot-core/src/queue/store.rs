//! In-memory job queue store.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::domain::{JobId, JobPayload, JobPriority, JobRecord, JobStatus, JobType};
use crate::observability::QueueStats;
use crate::queue::RetryPolicy;

/// Options accepted at submission time.
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    pub priority: JobPriority,
    pub max_attempts: Option<u32>,
    pub submitted_by: Option<String>,
}

const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Queue state: the job map is the single source of truth; `order` remembers
/// submission order (the FIFO tie-break within a priority tier) and
/// `in_flight` guards against double-dispatch across overlapping poll ticks.
struct QueueState {
    jobs: HashMap<JobId, JobRecord>,
    order: Vec<JobId>,
    in_flight: HashSet<JobId>,
}

impl QueueState {
    fn new() -> Self {
        Self {
            jobs: HashMap::new(),
            order: Vec::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Runnable candidates in dispatch order: priority rank first, then
    /// submission order within a tier (stable sort over `order`).
    fn candidates(&self, now: Instant, limit: usize) -> Vec<(JobId, JobType)> {
        let mut runnable: Vec<&JobRecord> = self
            .order
            .iter()
            .filter_map(|id| self.jobs.get(id))
            .filter(|job| job.is_runnable(now) && !self.in_flight.contains(&job.id))
            .collect();
        runnable.sort_by_key(|job| job.priority.rank());
        runnable
            .iter()
            .take(limit)
            .map(|job| (job.id, job.job_type()))
            .collect()
    }
}

/// Registry of submitted jobs plus the claim/settle API the scheduler drives.
///
/// All read-modify-write sequences happen under one lock, which is what
/// makes the at-most-one-concurrent-execution guarantee hold.
pub struct JobQueue {
    state: Mutex<QueueState>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::new()),
        }
    }

    /// Submit a job. It becomes visible to the scheduler on its next poll.
    pub async fn add_job(&self, payload: JobPayload, options: SubmitOptions) -> JobId {
        let job = JobRecord::new(
            payload,
            options.priority,
            options.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            options.submitted_by,
        );
        let id = job.id;
        let job_type = job.job_type();
        let priority = job.priority;

        let mut state = self.state.lock().await;
        state.jobs.insert(id, job);
        state.order.push(id);
        info!(
            job_id = %id,
            %job_type,
            ?priority,
            queue_size = state.jobs.len(),
            "job added to queue"
        );
        id
    }

    /// Snapshot of one job.
    pub async fn get_job(&self, id: JobId) -> Option<JobRecord> {
        self.state.lock().await.jobs.get(&id).cloned()
    }

    /// Counts by status plus current in-flight concurrency.
    pub async fn stats(&self) -> QueueStats {
        let state = self.state.lock().await;
        let mut stats = QueueStats {
            total: state.jobs.len(),
            in_flight: state.in_flight.len(),
            ..QueueStats::default()
        };
        for job in state.jobs.values() {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Retrying => stats.retrying += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }

    /// How many jobs currently occupy a concurrency slot.
    pub(crate) async fn in_flight_len(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// Runnable candidates in dispatch order, up to `limit`.
    pub(crate) async fn select_candidates(&self, limit: usize) -> Vec<(JobId, JobType)> {
        self.state.lock().await.candidates(Instant::now(), limit)
    }

    /// Claim a job for processing: marks it `Processing`, increments its
    /// attempt counter, and reserves its concurrency slot. Returns `None` if
    /// the job is gone, no longer runnable, or already in flight.
    pub(crate) async fn claim(&self, id: JobId) -> Option<JobRecord> {
        let mut state = self.state.lock().await;
        if state.in_flight.contains(&id) {
            return None;
        }
        let job = state.jobs.get_mut(&id)?;
        if !job.is_runnable(Instant::now()) {
            return None;
        }
        job.start_attempt();
        let snapshot = job.clone();
        state.in_flight.insert(id);
        info!(
            job_id = %id,
            job_type = %snapshot.job_type(),
            attempt = snapshot.attempts,
            max_attempts = snapshot.max_attempts,
            "processing job"
        );
        Some(snapshot)
    }

    /// Terminal failure without an attempt: used when no processor is
    /// registered for the job's type (a configuration error, never retried).
    pub(crate) async fn mark_failed(&self, id: JobId, error: String) {
        let mut state = self.state.lock().await;
        if let Some(job) = state.jobs.get_mut(&id) {
            error!(job_id = %id, job_type = %job.job_type(), error, "job failed");
            job.mark_failed(error);
        }
    }

    /// Successful completion; releases the concurrency slot.
    pub(crate) async fn settle_success(&self, id: JobId) {
        let mut state = self.state.lock().await;
        state.in_flight.remove(&id);
        if let Some(job) = state.jobs.get_mut(&id) {
            job.mark_completed();
            info!(job_id = %id, job_type = %job.job_type(), "job completed");
        }
    }

    /// Failed attempt: schedules a retry with backoff, or marks the job
    /// permanently failed once attempts are exhausted. Releases the slot
    /// either way. Returns `true` when a retry was scheduled.
    pub(crate) async fn settle_failure(
        &self,
        id: JobId,
        error: String,
        policy: &RetryPolicy,
    ) -> bool {
        let mut state = self.state.lock().await;
        state.in_flight.remove(&id);
        let Some(job) = state.jobs.get_mut(&id) else {
            return false;
        };

        if job.attempts < job.max_attempts {
            let delay = policy.next_delay(job.attempts);
            job.schedule_retry(Instant::now() + delay, error.clone());
            info!(
                job_id = %id,
                next_attempt = job.attempts + 1,
                retry_delay_ms = delay.as_millis() as u64,
                error,
                "job scheduled for retry"
            );
            true
        } else {
            error!(
                job_id = %id,
                job_type = %job.job_type(),
                attempts = job.attempts,
                error,
                "job failed"
            );
            job.mark_failed(error);
            false
        }
    }

    /// Drop completed jobs older than `retention` (measured from
    /// completion). Failed jobs are kept for inspection.
    pub(crate) async fn sweep_completed(&self, retention: Duration) {
        let cutoff = chrono::Utc::now()
            - chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::zero());
        let mut state = self.state.lock().await;
        let state = &mut *state;
        let before = state.jobs.len();
        state.jobs.retain(|_, job| {
            job.status != JobStatus::Completed
                || job.completed_at.is_none_or(|done| done > cutoff)
        });
        if state.jobs.len() < before {
            let jobs = &state.jobs;
            state.order.retain(|id| jobs.contains_key(id));
            info!(
                removed = before - jobs.len(),
                remaining = jobs.len(),
                "retention sweep dropped completed jobs"
            );
        }
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentKind, EmailKind};

    fn email_payload() -> JobPayload {
        JobPayload::EmailNotification {
            recipients: vec!["a@example.com".to_string()],
            subject: "hi".to_string(),
            content: "body".to_string(),
            kind: EmailKind::Notification,
        }
    }

    fn processing_payload() -> JobPayload {
        JobPayload::ContentProcessing {
            content_id: "v1".to_string(),
            content: ContentKind::Video,
            operations: vec!["thumbnail".to_string()],
        }
    }

    fn with_priority(priority: JobPriority) -> SubmitOptions {
        SubmitOptions {
            priority,
            ..SubmitOptions::default()
        }
    }

    #[tokio::test]
    async fn added_job_is_pending_and_counted() {
        let queue = JobQueue::new();
        let id = queue.add_job(email_payload(), SubmitOptions::default()).await;

        let job = queue.get_job(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert_eq!(job.max_attempts, DEFAULT_MAX_ATTEMPTS);

        let stats = queue.stats().await;
        assert_eq!(stats.total, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn candidates_are_ordered_by_priority_then_submission() {
        let queue = JobQueue::new();
        let low = queue.add_job(email_payload(), with_priority(JobPriority::Low)).await;
        let critical = queue
            .add_job(email_payload(), with_priority(JobPriority::Critical))
            .await;
        let normal = queue
            .add_job(email_payload(), with_priority(JobPriority::Normal))
            .await;
        let high = queue.add_job(email_payload(), with_priority(JobPriority::High)).await;

        let order: Vec<JobId> = queue
            .select_candidates(10)
            .await
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(order, vec![critical, high, normal, low]);
    }

    #[tokio::test]
    async fn fifo_within_a_priority_tier() {
        let queue = JobQueue::new();
        let first = queue.add_job(email_payload(), SubmitOptions::default()).await;
        let second = queue.add_job(processing_payload(), SubmitOptions::default()).await;

        let order: Vec<JobId> = queue
            .select_candidates(10)
            .await
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(order, vec![first, second]);
    }

    #[tokio::test]
    async fn claim_marks_processing_and_reserves_the_slot() {
        let queue = JobQueue::new();
        let id = queue.add_job(email_payload(), SubmitOptions::default()).await;

        let job = queue.claim(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.attempts, 1);
        assert!(job.processed_at.is_some());
        assert_eq!(queue.in_flight_len().await, 1);

        // In-flight jobs are neither claimable nor selectable.
        assert!(queue.claim(id).await.is_none());
        assert!(queue.select_candidates(10).await.is_empty());
    }

    #[tokio::test]
    async fn settle_success_completes_and_frees_the_slot() {
        let queue = JobQueue::new();
        let id = queue.add_job(email_payload(), SubmitOptions::default()).await;
        queue.claim(id).await.unwrap();

        queue.settle_success(id).await;
        let job = queue.get_job(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        assert_eq!(queue.in_flight_len().await, 0);
    }

    #[tokio::test]
    async fn retry_becomes_selectable_only_after_the_backoff() {
        let queue = JobQueue::new();
        let policy = RetryPolicy::new(vec![Duration::from_millis(40)]);
        let id = queue.add_job(email_payload(), SubmitOptions::default()).await;
        queue.claim(id).await.unwrap();

        let retried = queue.settle_failure(id, "flaky".to_string(), &policy).await;
        assert!(retried);
        let job = queue.get_job(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Retrying);
        assert_eq!(job.last_error.as_deref(), Some("flaky"));

        assert!(queue.select_candidates(10).await.is_empty());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queue.select_candidates(10).await.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_attempts_fail_permanently() {
        let queue = JobQueue::new();
        let policy = RetryPolicy::new(vec![Duration::from_millis(1)]);
        let id = queue
            .add_job(
                email_payload(),
                SubmitOptions {
                    max_attempts: Some(1),
                    ..SubmitOptions::default()
                },
            )
            .await;
        queue.claim(id).await.unwrap();

        let retried = queue.settle_failure(id, "boom".to_string(), &policy).await;
        assert!(!retried);
        let job = queue.get_job(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.attempts, 1);
        assert_eq!(job.last_error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn sweep_drops_old_completed_jobs_only() {
        let queue = JobQueue::new();
        let done = queue.add_job(email_payload(), SubmitOptions::default()).await;
        let pending = queue.add_job(email_payload(), SubmitOptions::default()).await;
        queue.claim(done).await.unwrap();
        queue.settle_success(done).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        queue.sweep_completed(Duration::from_millis(10)).await;

        assert!(queue.get_job(done).await.is_none());
        assert!(queue.get_job(pending).await.is_some());
        assert_eq!(queue.stats().await.total, 1);
    }

    #[tokio::test]
    async fn sweep_keeps_recent_completed_jobs() {
        let queue = JobQueue::new();
        let done = queue.add_job(email_payload(), SubmitOptions::default()).await;
        queue.claim(done).await.unwrap();
        queue.settle_success(done).await;

        queue.sweep_completed(Duration::from_secs(300)).await;
        assert!(queue.get_job(done).await.is_some());
    }
}
