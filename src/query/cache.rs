//! Memoization for parsed queries and search results.
//!
//! The tree is frozen before any query runs, so a cached value never goes
//! stale and entries are kept for the lifetime of the cache. Concurrent
//! misses on one key may both compute; the values are equal, so the last
//! write wins.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Unbounded, thread-safe memo table
pub struct MemoCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>, ahash::RandomState>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Eq + Hash, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::with_hasher(ahash::RandomState::new())),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl<K: Eq + Hash, V> MemoCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let found = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned());

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&self, key: K, value: Arc<V>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, value);
        }
    }

    /// Cached value for `key`, computing and storing it on a miss.
    /// `compute` runs without any lock held.
    pub fn get_or_insert_with<Q>(&self, key: &Q, compute: impl FnOnce() -> V) -> Arc<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(value) = self.get(key) {
            return value;
        }

        let value = Arc::new(compute());
        self.insert(key.to_owned(), Arc::clone(&value));
        value
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hit_rate(&self) -> f32 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f32 / total as f32
        }
    }
}
