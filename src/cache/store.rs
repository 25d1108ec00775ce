//! Cache Store Module
//!
//! Synchronous storage engine behind the in-memory response cache: a HashMap
//! of entries with LRU eviction and TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH};
use crate::error::CacheError;

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Usage counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Set ==
    /// Stores a value under `key` for `ttl`, replacing any previous entry.
    ///
    /// When a new key arrives at capacity, the least recently used entry is
    /// evicted first.
    pub fn set(&mut self, key: String, value: Value, ttl: Duration) -> Result<(), CacheError> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted_key) => {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(CacheError::CacheFull(
                        "cache is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, ttl));
        Ok(())
    }

    // == Get ==
    /// Returns a live value. Expired entries are dropped and count as misses.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes an entry. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.record_invalidation();
        }
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        expired_keys.len()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100);
        store.set("k".to_string(), json!({"count": 2}), TTL).unwrap();

        assert_eq!(store.get("k"), Some(json!({"count": 2})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing_is_miss() {
        let mut store = CacheStore::new(100);
        assert!(store.get("nope").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(100);
        store.set("k".to_string(), json!(1), TTL).unwrap();

        assert!(store.delete("k"));
        assert!(!store.delete("k"));
        assert!(store.is_empty());
        assert_eq!(store.stats().invalidations, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(100);
        store.set("k".to_string(), json!(1), TTL).unwrap();
        store.set("k".to_string(), json!(2), TTL).unwrap();

        assert_eq!(store.get("k"), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(100);
        store
            .set("k".to_string(), json!(1), Duration::from_secs(1))
            .unwrap();
        assert!(store.get("k").is_some());

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert!(store.get("k").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = CacheStore::new(2);
        store.set("a".to_string(), json!(1), TTL).unwrap();
        store.set("b".to_string(), json!(2), TTL).unwrap();

        // Reading `a` makes `b` the eviction candidate
        store.get("a").unwrap();
        store.set("c".to_string(), json!(3), TTL).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get("b").is_none());
        assert!(store.get("a").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_cleanup_expired() {
        let mut store = CacheStore::new(100);
        store
            .set("short".to_string(), json!(1), Duration::from_secs(1))
            .unwrap();
        store
            .set("long".to_string(), json!(2), Duration::from_secs(10))
            .unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("long").is_some());
    }

    #[test]
    fn test_store_key_too_long() {
        let mut store = CacheStore::new(100);
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        let result = store.set(long_key, json!(1), TTL);
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_store_zero_capacity_rejects_writes() {
        let mut store = CacheStore::new(0);
        let result = store.set("k".to_string(), json!(1), TTL);
        assert!(matches!(result, Err(CacheError::CacheFull(_))));
    }
}
