//! Cache Statistics Module
//!
//! Tracks aggregate hit/miss behavior across all call sites.

use serde::{Deserialize, Serialize};

// == Cache Stats ==
/// Monotonically accumulating request counters.
///
/// Persisted to the durable stats slot alongside the entry map, so the
/// counters survive process restarts. Reset only by an explicit `clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing, or an expired entry
    pub misses: u64,
    /// Total number of reads
    pub total_requests: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / total_requests, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit and request counters.
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.total_requests += 1;
    }

    // == Record Miss ==
    /// Increments the miss and request counters.
    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.total_requests += 1;
    }

    // == Reset ==
    /// Zeroes all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
