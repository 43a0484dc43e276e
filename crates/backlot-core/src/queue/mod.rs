//! Job queue: retry policy, handler registry, queue store, and scheduler.

pub mod registry;
pub mod retry;
pub mod scheduler;
pub mod store;

pub use registry::{HandlerRegistry, JobHandler};
pub use retry::RetryPolicy;
pub use scheduler::{Scheduler, SchedulerHandle};
pub use store::{JobQueue, SubmitOptions};
