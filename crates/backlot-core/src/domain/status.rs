//! Job status state machine.

use serde::{Deserialize, Serialize};

/// Job status.
///
/// State transitions:
/// - Pending -> Processing -> Completed
/// - Pending -> Processing -> Retrying -> Processing (loop until max_attempts)
/// - Pending -> Processing -> Failed (max_attempts exceeded)
/// - Pending -> Failed (no processor registered: configuration error)
///
/// `Completed` and `Failed` are terminal; a record in a terminal status never
/// transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Submitted, waiting for a concurrency slot.
    Pending,

    /// A processor is currently executing this job.
    Processing,

    /// Failed, waiting out the backoff delay before the next attempt.
    Retrying,

    /// Finished successfully.
    Completed,

    /// Failed permanently (exhausted retries or configuration error).
    Failed,
}

impl JobStatus {
    /// Is this a terminal status (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Is this job a selection candidate? (`Retrying` additionally needs its
    /// backoff deadline to have elapsed; the queue checks that.)
    pub fn is_runnable(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Retrying)
    }
}
