//! Default job processors for the platform's job types.
//!
//! Each processor is a [`JobHandler`] over its typed payload variant. The
//! bulk processors work in small batches with a short pause in between, and
//! treat duplicate-key/constraint errors as per-item problems: log, skip,
//! keep going. Only an unavailable store aborts the handler (and triggers a
//! retry).

mod content;
mod email;
mod uploads;

use std::sync::Arc;

pub use content::ContentProcessingProcessor;
pub use email::EmailNotificationProcessor;
pub use uploads::{BulkBlogUploadProcessor, BulkVideoUploadProcessor};

use crate::domain::JobType;
use crate::ports::ContentStore;
use crate::queue::HandlerRegistry;

/// Register the platform's default processors against a content store.
pub fn register_default_processors(registry: &mut HandlerRegistry, store: Arc<dyn ContentStore>) {
    registry.register_with_hint(
        JobType::BulkVideoUpload,
        Arc::new(BulkVideoUploadProcessor::new(store.clone())),
        2,
    );
    registry.register_with_hint(
        JobType::BulkBlogUpload,
        Arc::new(BulkBlogUploadProcessor::new(store)),
        2,
    );
    registry.register_with_hint(
        JobType::ContentProcessing,
        Arc::new(ContentProcessingProcessor::default()),
        3,
    );
    registry.register_with_hint(
        JobType::EmailNotification,
        Arc::new(EmailNotificationProcessor::default()),
        5,
    );
}
