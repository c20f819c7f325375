use crate::{
    constants::{SEARCH_CACHE_CAPACITY, SEARCH_CACHE_TTL_SECS},
    prelude::{Arc, Duration, Instant, Mutex},
};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Per-query result cache with LRU eviction and a freshness window.
///
/// Entries older than the TTL are treated as absent and evicted on lookup.
#[derive(Debug)]
pub struct QueryCache<V> {
    cache: Arc<Mutex<LruCache<String, (Instant, V)>>>,
    ttl: Duration,
}

impl<V: Clone> QueryCache<V> {
    /// Create a new cache with the given capacity and freshness window
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(SEARCH_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key` as of `now`
    pub fn get(&self, key: &str, now: Instant) -> Option<V> {
        let mut cache = self.cache.lock().ok()?;
        let (stored_at, value) = cache.get(key)?;
        if now.saturating_duration_since(*stored_at) < self.ttl {
            return Some(value.clone());
        }
        cache.pop(key);
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V, now: Instant) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key.into(), (now, value));
        }
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Number of entries, fresh or not
    pub fn len(&self) -> usize {
        self.cache.lock().ok().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.cap().get())
            .unwrap_or(0)
    }
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new(
            SEARCH_CACHE_CAPACITY,
            Duration::from_secs(SEARCH_CACHE_TTL_SECS),
        )
    }
}
