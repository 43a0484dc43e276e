//! Email notification processor.
//!
//! Delivery through a real email service is wired elsewhere; this one logs
//! the send after a short simulated round-trip.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::{JobPayload, JobRecord};
use crate::error::CoreError;
use crate::queue::JobHandler;

pub struct EmailNotificationProcessor {
    send_delay: Duration,
}

impl EmailNotificationProcessor {
    pub fn new(send_delay: Duration) -> Self {
        Self { send_delay }
    }
}

impl Default for EmailNotificationProcessor {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl JobHandler for EmailNotificationProcessor {
    async fn handle(&self, job: &JobRecord) -> Result<(), CoreError> {
        let JobPayload::EmailNotification {
            recipients,
            subject,
            kind,
            ..
        } = &job.payload
        else {
            return Err(CoreError::handler(format!(
                "unexpected payload for email-notifications: {}",
                job.payload.job_type()
            )));
        };

        info!(
            job_id = %job.id,
            recipient_count = recipients.len(),
            kind = ?kind,
            "processing email notifications"
        );

        tokio::time::sleep(self.send_delay).await;

        debug!(
            job_id = %job.id,
            recipients = recipients.len(),
            subject = subject.chars().take(50).collect::<String>(),
            "email notifications sent"
        );
        Ok(())
    }
}
