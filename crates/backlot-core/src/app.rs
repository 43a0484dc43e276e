//! Application construction and lifecycle.
//!
//! Everything is an explicitly constructed instance handed out through
//! [`App`]; there are no process-wide singletons. Route handlers receive the
//! `App` (or clones of its `Arc`s) through whatever context mechanism the
//! embedding service uses.

use std::sync::Arc;

use crate::cache::CacheManager;
use crate::config::{CacheConfig, QueueConfig};
use crate::domain::JobType;
use crate::ports::{ContentStore, RemoteCache};
use crate::processors::register_default_processors;
use crate::queue::{HandlerRegistry, JobHandler, JobQueue, RetryPolicy, Scheduler, SchedulerHandle};

/// Builder for the background core.
///
/// Defaults: development configs, default retry table, no remote cache tier.
/// When a content store is supplied, the platform's default processors are
/// registered first; explicit registrations are applied afterwards and may
/// overwrite them.
pub struct AppBuilder {
    cache_config: CacheConfig,
    queue_config: QueueConfig,
    retry_policy: RetryPolicy,
    remote_cache: Option<Arc<dyn RemoteCache>>,
    content_store: Option<Arc<dyn ContentStore>>,
    handlers: Vec<(JobType, Arc<dyn JobHandler>)>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            cache_config: CacheConfig::default(),
            queue_config: QueueConfig::default(),
            retry_policy: RetryPolicy::default(),
            remote_cache: None,
            content_store: None,
            handlers: Vec::new(),
        }
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn queue_config(mut self, config: QueueConfig) -> Self {
        self.queue_config = config;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Configure the optional distributed cache tier.
    pub fn remote_cache(mut self, remote: Arc<dyn RemoteCache>) -> Self {
        self.remote_cache = Some(remote);
        self
    }

    /// Configure the persistence collaborator; enables the default
    /// processors.
    pub fn content_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.content_store = Some(store);
        self
    }

    /// Register (or override) a processor for a job type.
    pub fn register(mut self, job_type: JobType, handler: Arc<dyn JobHandler>) -> Self {
        self.handlers.push((job_type, handler));
        self
    }

    /// Construct the core and start the scheduler.
    pub fn build(self) -> App {
        let mut registry = HandlerRegistry::new();
        if let Some(store) = self.content_store {
            register_default_processors(&mut registry, store);
        }
        for (job_type, handler) in self.handlers {
            registry.register(job_type, handler);
        }

        let cache = Arc::new(CacheManager::new(self.cache_config, self.remote_cache));
        let queue = Arc::new(JobQueue::new());
        let scheduler = Scheduler::spawn(
            queue.clone(),
            Arc::new(registry),
            self.retry_policy,
            self.queue_config,
        );

        App {
            cache,
            queue,
            scheduler,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The running background core.
pub struct App {
    pub cache: Arc<CacheManager>,
    pub queue: Arc<JobQueue>,
    scheduler: SchedulerHandle,
}

impl App {
    /// Stop the scheduler's poll loop and wait for it to exit. In-flight
    /// handlers finish on their own tasks.
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
    }
}
