//! Keyed fetch cache
//!
//! Maps a key to the three-state lifecycle of one outstanding or completed
//! fetch: `Pending`, `Resolved`, or `Failed`. The cache itself never
//! performs I/O; `request` tells the caller whether it must issue the one
//! outbound fetch, and the completion is reported back with `complete`.
//! This keeps all mutation on the driving task, no locking required.

use std::collections::HashMap;
use std::hash::Hash;

/// Lifecycle of one cached fetch
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry<T> {
    /// Fetch issued, result not yet in
    Pending,
    /// Fetch completed successfully
    Resolved(T),
    /// Fetch completed with an error
    Failed(String),
}

impl<T> CacheEntry<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, CacheEntry::Pending)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CacheEntry::Resolved(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CacheEntry::Failed(_))
    }
}

/// Keyed request cache with at-most-one-fetch-per-key deduplication.
///
/// Invariant: at most one `Pending` entry per key at any time. A second
/// `request` for a key that is already `Pending` attaches to the existing
/// entry instead of issuing a duplicate fetch.
#[derive(Debug)]
pub struct FetchCache<K, T> {
    entries: HashMap<K, CacheEntry<T>>,
}

impl<K: Eq + Hash, T> Default for FetchCache<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, T> FetchCache<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `key`.
    ///
    /// Returns `true` exactly when the caller must issue the single
    /// outbound fetch for this key: no entry yet, or the previous fetch
    /// `Failed`. A `Pending` entry (dedup) or a `Resolved` entry (cache
    /// hit) returns `false`.
    pub fn request(&mut self, key: K) -> bool {
        match self.entries.get(&key) {
            Some(CacheEntry::Pending) | Some(CacheEntry::Resolved(_)) => false,
            Some(CacheEntry::Failed(_)) | None => {
                self.entries.insert(key, CacheEntry::Pending);
                true
            }
        }
    }

    /// Record the completion of the outbound fetch for `key`.
    ///
    /// Completions always populate the cache, even when nobody is watching
    /// the key anymore (fetches are never cancelled, only ignored).
    pub fn complete(&mut self, key: K, result: Result<T, String>) {
        let entry = match result {
            Ok(value) => CacheEntry::Resolved(value),
            Err(reason) => CacheEntry::Failed(reason),
        };
        self.entries.insert(key, entry);
    }

    /// Current entry for `key`, if any
    pub fn entry(&self, key: &K) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    /// Resolved value for `key`, if the fetch has succeeded
    pub fn resolved(&self, key: &K) -> Option<&T> {
        match self.entries.get(key) {
            Some(CacheEntry::Resolved(value)) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        matches!(self.entries.get(key), Some(CacheEntry::Pending))
    }
}
