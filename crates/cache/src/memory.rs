//! In-memory LRU store.

use std::{num::NonZeroUsize, sync::Mutex};

use bytes::Bytes;
use kelp_traits::{Cache, CacheError};
use lru::LruCache;

/// In-memory LRU store.
///
/// Entries have no expiry: cached values are immutable facts, so the
/// only bound is the capacity-driven LRU eviction.
pub struct MemoryCache {
    cache: Mutex<LruCache<String, Bytes>>,
}

impl MemoryCache {
    /// Create a new memory store with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1000).unwrap());
        Self { cache: Mutex::new(LruCache::new(cap)) }
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache").finish_non_exhaustive()
    }
}

impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut cache =
            self.cache.lock().map_err(|e| CacheError::new(format!("lock poisoned: {e}")))?;

        Ok(cache.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let mut cache =
            self.cache.lock().map_err(|e| CacheError::new(format!("lock poisoned: {e}")))?;

        cache.put(key.to_string(), value);
        Ok(())
    }
}
