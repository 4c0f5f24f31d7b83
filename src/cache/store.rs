//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with namespace TTL policies,
//! capacity eviction, hit/miss accounting and durable persistence.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, LoadingSet, PolicyTable};
use crate::config::Config;
use crate::storage::{BlobStore, MemoryBlobStore, ENTRIES_SLOT, STATS_SLOT};

// == Persistence Payloads ==
/// Write-side snapshot of the entry map, borrowing the live map.
#[derive(Serialize)]
struct EntriesSnapshotRef<'a> {
    written_at: DateTime<Utc>,
    entries: &'a HashMap<String, CacheEntry>,
}

/// Read-side snapshot of the entry map.
#[derive(Deserialize)]
struct EntriesSnapshot {
    written_at: DateTime<Utc>,
    entries: HashMap<String, CacheEntry>,
}

// == Batch Item ==
/// One element of a `set_multiple` batch.
#[derive(Debug, Clone)]
pub struct BatchItem<T> {
    /// The cache key
    pub key: String,
    /// The payload to store
    pub data: T,
    /// Optional TTL override in milliseconds
    pub ttl_ms: Option<u64>,
}

// == Cache Store ==
/// Authoritative key-to-entry mapping with TTL expiry, per-namespace
/// capacity enforcement, pattern invalidation and durable persistence.
///
/// Entries and stats are re-serialized to the blob store on every mutation;
/// storage failures are logged and never surfaced to callers, so the
/// in-memory state stays authoritative and the cache degrades to an empty
/// cache in the worst case.
pub struct CacheStore {
    /// Key-to-entry storage
    entries: HashMap<String, CacheEntry>,
    /// Keys with a fetch in flight
    loading: LoadingSet,
    /// Aggregate hit/miss counters
    stats: CacheStats,
    /// Namespace TTL/capacity policies
    policies: PolicyTable,
    /// Durable blob store
    storage: Box<dyn BlobStore>,
    /// Next insertion sequence number
    seq: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store over the given policy table and blob store, restoring
    /// any previously persisted entries and stats.
    ///
    /// Entries whose TTL elapsed before construction are filtered out and
    /// never admitted to the live map. Unreadable or malformed blobs degrade
    /// to an empty map and zeroed stats.
    pub fn new(policies: PolicyTable, storage: Box<dyn BlobStore>) -> Self {
        let mut store = Self {
            entries: HashMap::new(),
            loading: LoadingSet::new(),
            stats: CacheStats::new(),
            policies,
            storage,
            seq: 0,
        };
        store.restore();
        store
    }

    /// Creates a store from configuration.
    pub fn from_config(config: &Config, storage: Box<dyn BlobStore>) -> Self {
        Self::new(config.policies.clone(), storage)
    }

    /// Creates a store backed by a fresh in-memory blob store.
    pub fn in_memory(policies: PolicyTable) -> Self {
        Self::new(policies, Box::new(MemoryBlobStore::new()))
    }

    // == Get ==
    /// Retrieves the payload stored under `key`.
    ///
    /// Returns `None` when the key is absent or its entry has expired;
    /// expired entries are removed on the spot. Every call counts one
    /// request and exactly one of hit/miss. A live payload that does not
    /// decode as `T` still counts as a hit but yields `None`.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let mut live_data = None;
        let mut expired = false;

        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                expired = true;
            } else {
                live_data = Some(entry.data.clone());
            }
        }

        if expired {
            self.entries.remove(key);
            self.persist_entries();
        }

        let result = match live_data {
            Some(data) => {
                self.stats.record_hit();
                match serde_json::from_value(data) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        debug!(
                            "Cached payload for '{}' does not match requested type: {}",
                            key, err
                        );
                        None
                    }
                }
            }
            None => {
                self.stats.record_miss();
                None
            }
        };

        self.persist_stats();
        result
    }

    // == Set ==
    /// Stores a payload under `key`, overwriting any previous entry.
    ///
    /// The effective TTL is `ttl_override_ms` if provided, otherwise the
    /// TTL of the namespace policy governing `key`. After insertion all
    /// expired entries are swept and the key's namespace is brought back
    /// within its capacity bound by silently evicting the oldest entries.
    ///
    /// # Arguments
    /// * `key` - The key to store under
    /// * `data` - The payload; serialized opaquely, never mutated
    /// * `ttl_override_ms` - Optional TTL override in milliseconds
    pub fn set<T: Serialize>(&mut self, key: &str, data: &T, ttl_override_ms: Option<u64>) {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                warn!("Dropping cache write for '{}', payload not serializable: {}", key, err);
                return;
            }
        };

        let ttl_ms = ttl_override_ms.unwrap_or_else(|| self.policies.resolve(key).ttl_ms);
        let seq = self.next_seq();
        self.entries.insert(key.to_string(), CacheEntry::new(data, ttl_ms, seq));

        self.remove_expired();
        self.enforce_capacity(key);
        self.persist_entries();
    }

    // == Remove ==
    /// Deletes the entry under `key` if present. Idempotent.
    pub fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist_entries();
        }
    }

    // == Clear ==
    /// Empties the entry map and loading set, zeroes stats and purges both
    /// durable slots.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.loading.clear();
        self.stats.reset();

        if let Err(err) = self.storage.delete_slot(ENTRIES_SLOT) {
            warn!("Failed to purge entries slot: {}", err);
        }
        if let Err(err) = self.storage.delete_slot(STATS_SLOT) {
            warn!("Failed to purge stats slot: {}", err);
        }
    }

    // == Invalidate Pattern ==
    /// Removes every entry whose key contains `pattern`.
    ///
    /// Coarse-grained invalidation for mutations that touch many keys at
    /// once, e.g. every cached page of a paginated resource. Not a read:
    /// stats are unaffected.
    pub fn invalidate_pattern(&mut self, pattern: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.contains(pattern));
        let removed = before - self.entries.len();

        if removed > 0 {
            debug!("Invalidated {} entries matching '{}'", removed, pattern);
            self.persist_entries();
        }
    }

    // == Stats ==
    /// Returns a snapshot of the current counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    // == Loading Flags ==
    /// Checks whether a fetch is in flight for `key`.
    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.contains(key)
    }

    /// Marks or unmarks a key as having a fetch in flight.
    pub fn set_loading(&mut self, key: &str, loading: bool) {
        self.loading.set(key, loading);
    }

    // == Batch Operations ==
    /// Per-key `get`; each lookup independently affects stats.
    pub fn get_multiple<T: DeserializeOwned>(&mut self, keys: &[&str]) -> HashMap<String, Option<T>> {
        keys.iter()
            .map(|key| ((*key).to_string(), self.get(key)))
            .collect()
    }

    /// Per-item `set`, applied in order.
    pub fn set_multiple<T: Serialize>(&mut self, items: &[BatchItem<T>]) {
        for item in items {
            self.set(&item.key, &item.data, item.ttl_ms);
        }
    }

    // == Sweep Expired ==
    /// Eagerly removes all expired entries.
    ///
    /// Returns the number of entries removed. Also invoked by the periodic
    /// sweep task; reads remove expired entries lazily regardless.
    pub fn sweep_expired(&mut self) -> usize {
        let removed = self.remove_expired();
        if removed > 0 {
            self.persist_entries();
        }
        removed
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries in the namespace governing `key`.
    pub fn namespace_len(&self, key: &str) -> usize {
        let namespace = self.policies.resolve_index(key);
        self.entries
            .keys()
            .filter(|k| self.policies.resolve_index(k) == namespace)
            .count()
    }

    // == Internals ==
    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);
        seq
    }

    fn remove_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    /// Evicts oldest entries until the namespace of `key` is within its
    /// capacity bound. Ordering is `stored_at` ascending with the insertion
    /// sequence breaking ties, so the most-recently-set keys survive even
    /// when several writes share one millisecond.
    fn enforce_capacity(&mut self, key: &str) {
        let namespace = self.policies.resolve_index(key);
        let limit = self.policies.resolve(key).max_entries;

        let mut members: Vec<(String, u64, u64)> = self
            .entries
            .iter()
            .filter(|(k, _)| self.policies.resolve_index(k) == namespace)
            .map(|(k, entry)| (k.clone(), entry.stored_at, entry.seq))
            .collect();

        if members.len() <= limit {
            return;
        }

        members.sort_by_key(|&(_, stored_at, seq)| (stored_at, seq));
        let excess = members.len() - limit;
        for (victim, _, _) in members.into_iter().take(excess) {
            debug!("Evicting '{}' to satisfy namespace capacity", victim);
            self.entries.remove(&victim);
        }
    }

    fn restore(&mut self) {
        match self.storage.read_slot(ENTRIES_SLOT) {
            Ok(Some(payload)) => match serde_json::from_str::<EntriesSnapshot>(&payload) {
                Ok(snapshot) => {
                    let now = current_timestamp_ms();
                    let total = snapshot.entries.len();
                    self.entries = snapshot
                        .entries
                        .into_iter()
                        .filter(|(_, entry)| !entry.is_expired_at(now))
                        .collect();
                    self.seq = self
                        .entries
                        .values()
                        .map(|entry| entry.seq)
                        .max()
                        .map_or(0, |max| max.wrapping_add(1));
                    debug!(
                        "Restored {} of {} cached entries (snapshot written at {})",
                        self.entries.len(),
                        total,
                        snapshot.written_at.to_rfc3339()
                    );
                }
                Err(err) => warn!("Discarding malformed entries payload: {}", err),
            },
            Ok(None) => {}
            Err(err) => warn!("Failed to read entries slot, starting empty: {}", err),
        }

        match self.storage.read_slot(STATS_SLOT) {
            Ok(Some(payload)) => match serde_json::from_str::<CacheStats>(&payload) {
                Ok(stats) => self.stats = stats,
                Err(err) => warn!("Discarding malformed stats payload: {}", err),
            },
            Ok(None) => {}
            Err(err) => warn!("Failed to read stats slot, starting zeroed: {}", err),
        }
    }

    fn persist_entries(&mut self) {
        let snapshot = EntriesSnapshotRef {
            written_at: Utc::now(),
            entries: &self.entries,
        };
        match serde_json::to_string(&snapshot) {
            Ok(payload) => {
                if let Err(err) = self.storage.write_slot(ENTRIES_SLOT, &payload) {
                    warn!("Failed to persist cache entries: {}", err);
                }
            }
            Err(err) => warn!("Failed to serialize cache entries: {}", err),
        }
    }

    fn persist_stats(&mut self) {
        match serde_json::to_string(&self.stats) {
            Ok(payload) => {
                if let Err(err) = self.storage.write_slot(STATS_SLOT, &payload) {
                    warn!("Failed to persist cache stats: {}", err);
                }
            }
            Err(err) => warn!("Failed to serialize cache stats: {}", err),
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("loading", &self.loading.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
