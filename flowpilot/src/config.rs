use std::{env, sync::LazyLock};

/// Lifetime in seconds of flows whose definition sets no ttl
pub static FLOW_DEFAULT_TTL: LazyLock<u64> = LazyLock::new(|| {
    env::var("FLOW_DEFAULT_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ttl| *ttl > 0)
        .unwrap_or(3600) // Default to 1 hour if not set or invalid
});

/// Cache namespace for persisted flow contexts
pub static FLOW_CACHE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    env::var("FLOW_CACHE_PREFIX")
        .ok()
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or("flow".to_string())
});

/// Seconds an expired flow stays in the cache so loading it reports expiry
pub static FLOW_EXPIRED_RETENTION: LazyLock<u64> = LazyLock::new(|| {
    env::var("FLOW_EXPIRED_RETENTION")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(300)
});

/// How often creating a flow retries after an identifier collision
pub static FLOW_ID_COLLISION_ATTEMPTS: LazyLock<usize> = LazyLock::new(|| {
    env::var("FLOW_ID_COLLISION_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|attempts| *attempts > 0)
        .unwrap_or(3)
});
