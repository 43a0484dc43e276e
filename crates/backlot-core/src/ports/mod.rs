//! Ports: interfaces to external collaborators.
//!
//! The core never talks to a database or a cache service directly; it goes
//! through these traits. Production wires real clients in, tests wire fakes.

pub mod content_store;
pub mod remote_cache;

pub use content_store::{BlogDraft, ContentStore, PublishState, StoreError, VideoDraft};
pub use remote_cache::{RemoteCache, RemoteCacheError};
