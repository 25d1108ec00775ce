//! Response cache backends
//!
//! `ResponseCache` is the capability the list cache policy is handed; any
//! key/value store with expiring entries can implement it. `MemoryCache` is
//! the in-process implementation used by the service binary.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::error::CacheError;

/// Key/value store for serialized responses.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the live value for `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

// == Memory Cache ==
/// In-process response cache with LRU eviction and TTL expiry.
#[derive(Debug)]
pub struct MemoryCache {
    store: RwLock<CacheStore>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: RwLock::new(CacheStore::new(max_entries)),
        }
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        // Write lock: a read refreshes LRU order and may drop an expired entry
        Ok(self.store.write().await.get(key))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        self.store.write().await.set(key.to_string(), value, ttl)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.write().await.delete(key);
        Ok(())
    }
}
