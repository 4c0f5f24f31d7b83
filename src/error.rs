//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.
//!
//! Storage failures are recovered inside the cache store (the cache degrades
//! to empty-cache behavior); loader failures travel through `CachedFetch` as
//! opaque `anyhow` errors that the cache never inspects.

use thiserror::Error;

// == Storage Error Enum ==
/// Failure modes of the durable blob store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing a slot failed at the I/O level
    #[error("I/O failure on slot '{0}': {1}")]
    Io(String, String),

    /// A write would push the backing store past its size ceiling
    #[error("slot '{0}' would exceed storage capacity ({1} > {2} bytes)")]
    CapacityExceeded(String, usize, usize),
}

// == Result Type Alias ==
/// Convenience Result type for blob store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
