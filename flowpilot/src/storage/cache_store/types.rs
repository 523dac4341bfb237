use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

/// Process-local store; entries carry their own deadline and expire lazily
pub struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, (CacheData, Option<Instant>)>,
}

pub struct RedisCacheStore {
    pub(super) client: redis::Client,
}

#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store with a TTL in seconds.
    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError>;

    /// Get a value from the store. Expired entries are reported as absent.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;

    /// Put a value only if the key is free (atomic check-and-set).
    /// Returns true if the value was stored, false if the key was taken.
    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError>;

    /// Replace the value only if the stored value still equals `expected`.
    /// Returns true if the swap happened, false if another writer got there first.
    async fn compare_and_swap(
        &mut self,
        prefix: &str,
        key: &str,
        expected: &CacheData,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError>;
}
