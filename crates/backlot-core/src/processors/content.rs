//! Content processing (thumbnail generation and friends).
//!
//! The real media pipeline lives elsewhere; this processor simulates each
//! operation with a fixed delay, which is also what makes scheduler behavior
//! observable in tests.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::{JobPayload, JobRecord};
use crate::error::CoreError;
use crate::queue::JobHandler;

pub struct ContentProcessingProcessor {
    step_delay: Duration,
}

impl ContentProcessingProcessor {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }
}

impl Default for ContentProcessingProcessor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl JobHandler for ContentProcessingProcessor {
    async fn handle(&self, job: &JobRecord) -> Result<(), CoreError> {
        let JobPayload::ContentProcessing {
            content_id,
            content,
            operations,
        } = &job.payload
        else {
            return Err(CoreError::handler(format!(
                "unexpected payload for content-processing: {}",
                job.payload.job_type()
            )));
        };

        info!(
            job_id = %job.id,
            content_id,
            content_kind = ?content,
            operation_count = operations.len(),
            "processing content operations"
        );

        for operation in operations {
            tokio::time::sleep(self.step_delay).await;
            debug!(job_id = %job.id, operation, content_id, "content operation completed");
        }
        Ok(())
    }
}
