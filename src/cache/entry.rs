//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with payload and lifetime metadata.
///
/// The payload is stored as opaque JSON; the store never looks inside it.
/// Entries are serialized wholesale into the durable entries slot, so every
/// field here round-trips through persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored payload
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Effective time-to-live in milliseconds, resolved at store time
    pub ttl_ms: u64,
    /// Store-local insertion counter. Breaks `stored_at` ties during
    /// capacity eviction when several writes land in the same millisecond.
    pub seq: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `data` - The payload to store
    /// * `ttl_ms` - Effective TTL in milliseconds
    /// * `seq` - Insertion sequence number assigned by the store
    pub fn new(data: Value, ttl_ms: u64, seq: u64) -> Self {
        Self {
            data,
            stored_at: current_timestamp_ms(),
            ttl_ms,
            seq,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is live iff `now < stored_at + ttl_ms`,
    /// so it is expired the instant the TTL has fully elapsed. The deadline
    /// is computed with saturating arithmetic and the comparison holds even
    /// when the wall clock does not advance between calls.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock value.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.stored_at.saturating_add(self.ttl_ms)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds (0 once expired).
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.stored_at
            .saturating_add(self.ttl_ms)
            .saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
