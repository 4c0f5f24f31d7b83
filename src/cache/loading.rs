//! Loading Set Module
//!
//! Tracks keys with a first-time fetch in flight, so concurrent callers can
//! avoid issuing duplicate loads. Membership is a boolean flag only and is
//! never persisted.

use std::collections::HashSet;

// == Loading Set ==
/// Set of keys currently being fetched.
#[derive(Debug, Default)]
pub struct LoadingSet {
    keys: HashSet<String>,
}

impl LoadingSet {
    // == Constructor ==
    /// Creates a new empty loading set.
    pub fn new() -> Self {
        Self::default()
    }

    // == Contains ==
    /// Checks whether a load is in flight for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    // == Set ==
    /// Marks or unmarks a key as loading.
    ///
    /// Unmarking removes the key rather than storing `false`.
    pub fn set(&mut self, key: &str, loading: bool) {
        if loading {
            self.keys.insert(key.to_string());
        } else {
            self.keys.remove(key);
        }
    }

    // == Clear ==
    /// Removes all keys.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    // == Length ==
    /// Returns the number of in-flight keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
