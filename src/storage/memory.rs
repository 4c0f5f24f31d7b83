//! In-Memory Blob Store
//!
//! HashMap-backed implementation of the blob store contract with a byte
//! ceiling per slot, mirroring the size limits of real key-value stores.
//!
//! Handles share their contents: cloning a `MemoryBlobStore` yields a second
//! handle onto the same slots, which lets tests hand one backing store to
//! consecutive cache instances to exercise persistence round-trips.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{StorageError, StorageResult};
use crate::storage::BlobStore;

/// Default per-slot ceiling, a few MB like browser-style key-value stores.
pub const DEFAULT_SLOT_CAPACITY: usize = 4 * 1024 * 1024;

// == Memory Blob Store ==
/// Shared-handle in-memory blob store.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
    slot_capacity: usize,
}

impl MemoryBlobStore {
    // == Constructor ==
    /// Creates an empty store with the default slot capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SLOT_CAPACITY)
    }

    /// Creates an empty store with an explicit per-slot byte ceiling.
    pub fn with_capacity(slot_capacity: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            slot_capacity,
        }
    }

    /// Returns the number of populated slots.
    pub fn slot_count(&self) -> usize {
        self.slots.lock().expect("blob store lock poisoned").len()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read_slot(&self, name: &str) -> StorageResult<Option<String>> {
        let slots = self.slots.lock().expect("blob store lock poisoned");
        Ok(slots.get(name).cloned())
    }

    fn write_slot(&mut self, name: &str, payload: &str) -> StorageResult<()> {
        if payload.len() > self.slot_capacity {
            return Err(StorageError::CapacityExceeded(
                name.to_string(),
                payload.len(),
                self.slot_capacity,
            ));
        }
        let mut slots = self.slots.lock().expect("blob store lock poisoned");
        slots.insert(name.to_string(), payload.to_string());
        Ok(())
    }

    fn delete_slot(&mut self, name: &str) -> StorageResult<()> {
        let mut slots = self.slots.lock().expect("blob store lock poisoned");
        slots.remove(name);
        Ok(())
    }
}
