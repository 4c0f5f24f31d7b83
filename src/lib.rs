//! Dashboard Cache - a client-side data cache for dashboard UIs
//!
//! Sits between UI components and a backend API: decides what to keep, for
//! how long and how much space each key namespace may use, deduplicates
//! concurrent loads for the same key, tracks aggregate hit/miss statistics
//! and persists its state across process restarts.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod storage;
pub mod tasks;

pub use cache::{BatchItem, CacheStats, CacheStore, NamespacePolicy, PolicyTable};
pub use config::Config;
pub use error::{StorageError, StorageResult};
pub use fetch::{CachedFetch, SharedCache};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use tasks::spawn_sweep_task;
