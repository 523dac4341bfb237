use std::{env, sync::LazyLock};

use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

pub static GENERIC_CACHE_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_CACHE_STORE_TYPE")
        .ok()
        .unwrap_or("memory".to_string())
});

pub static GENERIC_CACHE_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_CACHE_STORE_URL")
        .ok()
        .unwrap_or("redis://localhost:6379".to_string())
});

/// Builds the cache store selected by `GENERIC_CACHE_STORE_TYPE`
pub async fn cache_store_from_env() -> Result<Box<dyn CacheStore>, StorageError> {
    build_cache_store(
        GENERIC_CACHE_STORE_TYPE.as_str(),
        GENERIC_CACHE_STORE_URL.as_str(),
    )
    .await
}

pub(super) async fn build_cache_store(
    store_type: &str,
    store_url: &str,
) -> Result<Box<dyn CacheStore>, StorageError> {
    tracing::info!(
        "Initializing cache store with type: {}, url: {}",
        store_type,
        store_url
    );

    let store: Box<dyn CacheStore> = match store_type {
        "memory" => Box::new(InMemoryCacheStore::new()),
        "redis" => {
            let client = redis::Client::open(store_url).inspect_err(|e| {
                tracing::error!("Failed to create Redis client: {}", e);
            })?;
            Box::new(RedisCacheStore::new(client))
        }
        t => {
            return Err(StorageError::Config(format!(
                "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
            )));
        }
    };

    store.init().await.inspect_err(|e| {
        tracing::error!("Failed to connect to cache store: {}", e);
    })?;

    tracing::info!(
        "Connected to cache store: type={}, url={}",
        store_type,
        store_url
    );

    Ok(store)
}
