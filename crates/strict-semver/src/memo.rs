//! Pluggable memoization caches
//!
//! The parser and the range evaluator never own a cache. Callers hand one in
//! and choose its concurrency level: `RefCell<HashMap<..>>` for a single
//! thread, `Mutex`/`RwLock` wrapped maps when the cache is shared.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, RwLock};

/// Associative cache consulted before a computation and filled after it
pub trait Memoizer<K, V> {
    /// Look up a previously stored value
    fn get(&self, key: &K) -> Option<V>;

    /// Store a value, replacing any previous one
    fn put(&self, key: K, value: V);
}

impl<K, V> Memoizer<K, V> for RefCell<HashMap<K, V>>
where
    K: Eq + Hash,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        self.borrow().get(key).cloned()
    }

    fn put(&self, key: K, value: V) {
        self.borrow_mut().insert(key, value);
    }
}

// A poisoned lock still holds a consistent map: entries are inserted whole.
impl<K, V> Memoizer<K, V> for Mutex<HashMap<K, V>>
where
    K: Eq + Hash,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn put(&self, key: K, value: V) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, value);
    }
}

impl<K, V> Memoizer<K, V> for RwLock<HashMap<K, V>>
where
    K: Eq + Hash,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        self.read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn put(&self, key: K, value: V) {
        self.write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, value);
    }
}
