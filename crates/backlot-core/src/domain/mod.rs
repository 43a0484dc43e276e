//! Domain model for background jobs (IDs, payloads, priority, status, record).

pub mod ids;
pub mod payload;
pub mod priority;
pub mod record;
pub mod status;

pub use ids::JobId;
pub use payload::{BlogEntry, ContentKind, EmailKind, JobPayload, JobType, VideoEntry};
pub use priority::JobPriority;
pub use record::JobRecord;
pub use status::JobStatus;
