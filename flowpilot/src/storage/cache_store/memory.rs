use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore};

const CACHE_PREFIX: &str = "cache";

impl InMemoryCacheStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }

    fn deadline(ttl: usize) -> Option<Instant> {
        (ttl > 0).then(|| Instant::now() + Duration::from_secs(ttl as u64))
    }

    /// Drops every entry whose deadline has passed
    fn evict_expired(&mut self) {
        let now = Instant::now();
        self.entry
            .retain(|_, (_, deadline)| deadline.is_none_or(|deadline| deadline > now));
    }

    /// Live value under `key`, ignoring entries whose deadline has passed
    fn live(&self, key: &str) -> Option<&CacheData> {
        match self.entry.get(key) {
            Some((_, Some(deadline))) if *deadline <= Instant::now() => None,
            Some((data, _)) => Some(data),
            None => None,
        }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        self.evict_expired();
        let key = Self::make_key(prefix, key);
        self.entry.insert(key, (value, Self::deadline(ttl)));
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        Ok(self.live(&key).cloned())
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.remove(&key);
        Ok(())
    }

    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError> {
        self.evict_expired();
        let key = Self::make_key(prefix, key);
        if self.live(&key).is_some() {
            return Ok(false);
        }
        self.entry.insert(key, (value, Self::deadline(ttl)));
        Ok(true)
    }

    async fn compare_and_swap(
        &mut self,
        prefix: &str,
        key: &str,
        expected: &CacheData,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError> {
        let key = Self::make_key(prefix, key);
        if self.live(&key) != Some(expected) {
            return Ok(false);
        }
        self.entry.insert(key, (value, Self::deadline(ttl)));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(value: &str) -> CacheData {
        CacheData {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_make_key() {
        // Given a prefix and key
        let result = InMemoryCacheStore::make_key("flow", "abc");

        // Then it should be namespaced under the cache prefix
        assert_eq!(result, "cache:flow:abc");
    }

    #[tokio::test]
    async fn test_put_get_and_remove() {
        // Given an in-memory cache store with a stored value
        let mut store = InMemoryCacheStore::new();
        store.put_with_ttl("test", "k", data("v"), 60).await.unwrap();

        // When getting the value
        let retrieved = store.get("test", "k").await.unwrap();

        // Then it should be returned
        assert_eq!(retrieved, Some(data("v")));

        // And after removal it should be gone
        store.remove("test", "k").await.unwrap();
        assert!(store.get("test", "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prefixes_are_isolated() {
        let mut store = InMemoryCacheStore::new();
        store.put_with_ttl("a", "same", data("1"), 60).await.unwrap();
        store.put_with_ttl("b", "same", data("2"), 60).await.unwrap();

        assert_eq!(store.get("a", "same").await.unwrap(), Some(data("1")));
        assert_eq!(store.get("b", "same").await.unwrap(), Some(data("2")));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        // Given an entry whose deadline is already in the past
        let mut store = InMemoryCacheStore::new();
        let key = InMemoryCacheStore::make_key("test", "old");
        store.entry.insert(
            key,
            (
                data("stale"),
                Some(Instant::now() - Duration::from_secs(1)),
            ),
        );

        // Then reads treat it as missing and the key can be claimed again
        assert!(store.get("test", "old").await.unwrap().is_none());
        assert!(
            store
                .put_if_not_exists("test", "old", data("fresh"), 60)
                .await
                .unwrap()
        );
        assert_eq!(store.get("test", "old").await.unwrap(), Some(data("fresh")));
    }

    #[tokio::test]
    async fn test_writes_evict_expired_entries() {
        // Given an entry that lives for one second
        let mut store = InMemoryCacheStore::new();
        store.put_with_ttl("test", "short", data("a"), 1).await.unwrap();
        store.put_with_ttl("test", "forever", data("b"), 0).await.unwrap();
        assert_eq!(store.entry.len(), 2);

        // When writing again after it expired
        tokio::time::sleep(Duration::from_millis(1100)).await;
        store
            .put_if_not_exists("test", "next", data("c"), 60)
            .await
            .unwrap();

        // Then the expired entry is gone from the map
        assert_eq!(store.entry.len(), 2);
        assert!(!store.entry.contains_key("cache:test:short"));
        assert!(store.entry.contains_key("cache:test:forever"));
    }

    #[tokio::test]
    async fn test_put_if_not_exists() {
        // Given an empty store
        let mut store = InMemoryCacheStore::new();

        // When claiming the same key twice
        let first = store
            .put_if_not_exists("test", "k", data("first"), 60)
            .await
            .unwrap();
        let second = store
            .put_if_not_exists("test", "k", data("second"), 60)
            .await
            .unwrap();

        // Then only the first claim wins
        assert!(first);
        assert!(!second);
        assert_eq!(store.get("test", "k").await.unwrap(), Some(data("first")));
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        // Given a stored value
        let mut store = InMemoryCacheStore::new();
        store.put_with_ttl("test", "k", data("v1"), 60).await.unwrap();

        // When swapping against the current value
        let swapped = store
            .compare_and_swap("test", "k", &data("v1"), data("v2"), 60)
            .await
            .unwrap();

        // Then the value is replaced
        assert!(swapped);
        assert_eq!(store.get("test", "k").await.unwrap(), Some(data("v2")));

        // And a swap against the stale value is refused
        let stale = store
            .compare_and_swap("test", "k", &data("v1"), data("v3"), 60)
            .await
            .unwrap();
        assert!(!stale);
        assert_eq!(store.get("test", "k").await.unwrap(), Some(data("v2")));
    }

    #[tokio::test]
    async fn test_compare_and_swap_missing_key() {
        let mut store = InMemoryCacheStore::new();

        let swapped = store
            .compare_and_swap("test", "missing", &data("v1"), data("v2"), 60)
            .await
            .unwrap();

        assert!(!swapped);
        assert!(store.get("test", "missing").await.unwrap().is_none());
    }
}
