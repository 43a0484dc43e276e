//! Job record: payload + scheduling metadata.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, JobPayload, JobPriority, JobStatus, JobType};

/// A submitted unit of work and its full lifecycle state.
///
/// Design:
/// - This is the single source of truth for a job's state.
/// - All transitions happen through methods; terminal statuses are final.
/// - Observable timestamps use wall-clock time; `retry_at` is an `Instant`
///   because it only feeds the selector's eligibility check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub payload: JobPayload,
    pub priority: JobPriority,
    pub status: JobStatus,

    /// Number of attempts started so far (including the current one while
    /// `Processing`). Never exceeds `max_attempts`.
    pub attempts: u32,
    pub max_attempts: u32,

    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Message from the most recent failure (set on retry and terminal
    /// failure, cleared by nothing).
    pub last_error: Option<String>,

    /// Who submitted this job (creator id, admin id, ...).
    pub submitted_by: Option<String>,

    /// Earliest moment a `Retrying` job becomes eligible again.
    #[serde(skip)]
    pub retry_at: Option<Instant>,
}

impl JobRecord {
    pub fn new(
        payload: JobPayload,
        priority: JobPriority,
        max_attempts: u32,
        submitted_by: Option<String>,
    ) -> Self {
        Self {
            id: JobId::new(),
            payload,
            priority,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            created_at: Utc::now(),
            processed_at: None,
            completed_at: None,
            last_error: None,
            submitted_by,
            retry_at: None,
        }
    }

    pub fn job_type(&self) -> JobType {
        self.payload.job_type()
    }

    /// Is this job eligible for dispatch right now?
    pub fn is_runnable(&self, now: Instant) -> bool {
        match self.status {
            JobStatus::Pending => true,
            JobStatus::Retrying => self.retry_at.is_none_or(|at| at <= now),
            _ => false,
        }
    }

    /// Mark as processing (increments `attempts`, stamps `processed_at`).
    pub fn start_attempt(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Processing;
        self.attempts += 1;
        self.processed_at = Some(Utc::now());
        self.retry_at = None;
    }

    /// Mark as completed (terminal).
    pub fn mark_completed(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark as permanently failed (terminal).
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.last_error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }

    /// Schedule a retry: eligible again once `retry_at` has elapsed.
    pub fn schedule_retry(&mut self, retry_at: Instant, error: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Retrying;
        self.retry_at = Some(retry_at);
        self.last_error = Some(error.into());
    }
}
