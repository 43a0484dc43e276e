//! Job processor registry (job type -> handler).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{JobRecord, JobType};
use crate::error::CoreError;

/// A processor for one job type.
///
/// A job "succeeds" when the handler returns `Ok`, even if some sub-items
/// inside a batch were logged and skipped. Handlers are re-executed from
/// scratch on retry, so they must be idempotent or tolerate partial
/// re-application.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &JobRecord) -> Result<(), CoreError>;
}

struct Registration {
    handler: Arc<dyn JobHandler>,

    /// Informational only: the scheduler enforces a single global cap.
    concurrency_hint: usize,
}

/// Registry of handlers, built during initialization and read-only during
/// operation. Re-registering a job type overwrites the previous handler
/// (last wins, logged).
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<JobType, Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, job_type: JobType, handler: Arc<dyn JobHandler>) {
        self.register_with_hint(job_type, handler, 1);
    }

    pub fn register_with_hint(
        &mut self,
        job_type: JobType,
        handler: Arc<dyn JobHandler>,
        concurrency_hint: usize,
    ) {
        let previous = self.handlers.insert(
            job_type,
            Registration {
                handler,
                concurrency_hint,
            },
        );
        if previous.is_some() {
            warn!(%job_type, "processor re-registered, previous handler replaced");
        } else {
            info!(%job_type, concurrency_hint, "processor registered");
        }
    }

    pub fn get(&self, job_type: JobType) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(&job_type).map(|r| r.handler.clone())
    }

    pub fn concurrency_hint(&self, job_type: JobType) -> Option<usize> {
        self.handlers.get(&job_type).map(|r| r.concurrency_hint)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
