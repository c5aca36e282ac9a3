//! Storage and eviction policy for cached entries.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use visor_common::CacheKey;

/// Map from key to cached value with a pluggable eviction policy.
pub trait CacheStore<V>: Send {
    /// Look up a key, refreshing its recency where the policy tracks it.
    fn get(&mut self, key: &CacheKey) -> Option<V>;

    fn insert(&mut self, key: CacheKey, value: V);

    fn contains(&self, key: &CacheKey) -> bool;

    fn remove(&mut self, key: &CacheKey) -> Option<V>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count entries matching `pred`.
    fn count_where(&self, pred: &dyn Fn(&V) -> bool) -> usize;

    fn clear(&mut self);

    /// Entries dropped by the policy so far.
    fn evictions(&self) -> u64 {
        0
    }
}

/// Keeps every entry for the lifetime of the store.
#[derive(Debug)]
pub struct UnboundedStore<V> {
    entries: HashMap<CacheKey, V>,
}

impl<V> UnboundedStore<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> Default for UnboundedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send> CacheStore<V> for UnboundedStore<V> {
    fn get(&mut self, key: &CacheKey) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, value: V) {
        self.entries.insert(key, value);
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&mut self, key: &CacheKey) -> Option<V> {
        self.entries.remove(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn count_where(&self, pred: &dyn Fn(&V) -> bool) -> usize {
        self.entries.values().filter(|v| pred(v)).count()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Keeps at most `capacity` entries, evicting the least recently used.
pub struct LruStore<V> {
    cache: LruCache<CacheKey, V>,
    evictions: u64,
}

impl<V> LruStore<V> {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            evictions: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}

impl<V: Clone + Send> CacheStore<V> for LruStore<V> {
    fn get(&mut self, key: &CacheKey) -> Option<V> {
        self.cache.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, value: V) {
        if let Some((evicted, _)) = self.cache.push(key.clone(), value) {
            if evicted != key {
                self.evictions += 1;
            }
        }
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    fn remove(&mut self, key: &CacheKey) -> Option<V> {
        self.cache.pop(key)
    }

    fn len(&self) -> usize {
        self.cache.len()
    }

    fn count_where(&self, pred: &dyn Fn(&V) -> bool) -> usize {
        self.cache.iter().filter(|(_, v)| pred(v)).count()
    }

    fn clear(&mut self) {
        self.cache.clear();
    }

    fn evictions(&self) -> u64 {
        self.evictions
    }
}

/// Store for a configured capacity; `None` is unbounded.
pub fn store_for<V: Clone + Send + 'static>(capacity: Option<usize>) -> Box<dyn CacheStore<V>> {
    match capacity {
        Some(capacity) => Box::new(LruStore::new(capacity)),
        None => Box::new(UnboundedStore::new()),
    }
}
