//! backlot-core
//!
//! Background core for a content-publishing platform: an in-process
//! asynchronous job queue with priority scheduling and retry/backoff, and a
//! tiered cache (in-memory TTL store + optional distributed tier).
//!
//! Module layout:
//! - **domain**: job model (ids, payloads, priority, status, record)
//! - **ports**: collaborator interfaces (content store, remote cache)
//! - **cache**: TTL store, key builders, tiered manager
//! - **queue**: retry policy, handler registry, queue store, scheduler
//! - **processors**: default handlers for the platform's job types
//! - **app**: explicit construction and lifecycle (no process-wide singletons)

pub mod app;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod ports;
pub mod processors;
pub mod queue;

pub use app::{App, AppBuilder};
pub use cache::CacheManager;
pub use config::{CacheConfig, QueueConfig};
pub use domain::{JobId, JobPayload, JobPriority, JobRecord, JobStatus, JobType};
pub use error::CoreError;
pub use observability::{CacheStats, QueueStats};
pub use queue::{HandlerRegistry, JobHandler, JobQueue, RetryPolicy, SubmitOptions};
