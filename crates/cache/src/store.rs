//! Runtime-selected store dispatch.

use bytes::Bytes;
use kelp_traits::{Cache, CacheError};

use crate::{MemoryCache, RedisCache};

/// A store selected at startup from configuration.
///
/// The [`Cache`] trait is not object-safe, so runtime selection between
/// store implementations is an enum dispatch.
#[derive(Debug)]
pub enum CacheStore {
    /// In-memory LRU store.
    Memory(MemoryCache),
    /// Redis store.
    Redis(RedisCache),
}

impl CacheStore {
    /// Create an in-memory store with the given capacity.
    #[must_use]
    pub fn memory(capacity: usize) -> Self {
        Self::Memory(MemoryCache::new(capacity))
    }

    /// Create a Redis store with the given connection URL.
    ///
    /// # Errors
    ///
    /// Returns a `CacheError` if the URL is invalid.
    pub fn redis(url: &str) -> Result<Self, CacheError> {
        Ok(Self::Redis(RedisCache::new(url)?))
    }
}

impl Cache for CacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Redis(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.set(key, value).await,
            Self::Redis(cache) => cache.set(key, value).await,
        }
    }
}
