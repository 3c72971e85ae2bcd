//! Bounded get-or-populate cache.
//!
//! Used by the IO layer for fetched profiles (e.g. JSON-LD contexts). Entries
//! are evicted least-recently-used once `capacity` is reached.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// LRU cache keyed by `K`
pub struct ProfileCache<K, V> {
    capacity: usize,
    inner: Mutex<CacheState<K, V>>,
}

struct CacheState<K, V> {
    entries: HashMap<K, V>,
    /// Least recently used at the front.
    order: VecDeque<K>,
}

impl<K, V> ProfileCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// `capacity` of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.inner.lock();
        let value = state.entries.get(key).cloned()?;
        state.touch(key);
        Some(value)
    }

    /// Cached value for `key`, calling `populate` on a miss.
    ///
    /// `populate` runs without the cache lock held; a failed population caches nothing.
    pub fn get_or_populate<F, E>(&self, key: &K, populate: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = populate(key)?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }

    pub fn insert(&self, key: K, value: V) {
        let mut state = self.inner.lock();
        if state.entries.insert(key.clone(), value).is_some() {
            state.touch(&key);
            return;
        }
        state.order.push_back(key);
        while state.entries.len() > self.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn invalidate(&self, key: &K) -> Option<V> {
        let mut state = self.inner.lock();
        let removed = state.entries.remove(key);
        if removed.is_some() {
            state.order.retain(|k| k != key);
        }
        removed
    }
}

impl<K: Eq + Clone, V> CacheState<K, V> {
    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}
