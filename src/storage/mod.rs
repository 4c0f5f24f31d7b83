//! Storage Module
//!
//! Abstracts the durable key-value blob store the cache persists into.
//!
//! The cache uses two logical slots: one for the serialized entry map and
//! one for the serialized stats. Backends only need synchronous read/write
//! of whole string blobs with a practical size ceiling of a few megabytes.
//!
//! # Backends
//! - [`MemoryBlobStore`] - shared-handle in-memory store, used in tests and
//!   as a null persistence layer
//! - [`FileBlobStore`] - one JSON file per slot under a directory

mod file;
mod memory;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

use crate::error::StorageResult;

// == Slot Names ==
/// Slot holding the serialized entry map.
pub const ENTRIES_SLOT: &str = "cache_entries";

/// Slot holding the serialized statistics.
pub const STATS_SLOT: &str = "cache_stats";

// == Blob Store Trait ==
/// Durable blob store contract.
///
/// All operations are synchronous from the cache's point of view. The cache
/// is the sole writer while the process runs; no cross-process coherency is
/// provided. Implementations must be shareable across tasks because the
/// store they back lives behind an `Arc<RwLock<_>>`.
pub trait BlobStore: Send + Sync {
    /// Reads a slot, returning `None` if it has never been written.
    fn read_slot(&self, name: &str) -> StorageResult<Option<String>>;

    /// Writes a slot, replacing any previous contents.
    fn write_slot(&mut self, name: &str, payload: &str) -> StorageResult<()>;

    /// Deletes a slot. Deleting an absent slot is a no-op.
    fn delete_slot(&mut self, name: &str) -> StorageResult<()>;
}
