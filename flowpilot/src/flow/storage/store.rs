use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::{FLOW_CACHE_PREFIX, FLOW_EXPIRED_RETENTION, FLOW_ID_COLLISION_ATTEMPTS};
use crate::flow::context::FlowContext;
use crate::flow::definition::FlowDefinition;
use crate::flow::errors::FlowError;
use crate::storage::{CacheData, CacheStore, InMemoryCacheStore, StorageError, cache_store_from_env};

/// Persists flow contexts in a cache store with optimistic versioning
///
/// Every commit names the version it was loaded at. The stored context is swapped
/// only if it still carries that version, so of two invocations racing on the same
/// flow exactly one commit succeeds and the other gets
/// [`FlowError::PersistenceConflict`].
///
/// Cache entries outlive their context by a retention window, so a flow used after
/// its expiry is reported as [`FlowError::Expired`] rather than unknown.
pub struct FlowStore {
    cache: Mutex<Box<dyn CacheStore>>,
    prefix: String,
    retention: u64,
}

impl FlowStore {
    pub fn new(cache: Box<dyn CacheStore>) -> Self {
        Self {
            cache: Mutex::new(cache),
            prefix: FLOW_CACHE_PREFIX.clone(),
            retention: *FLOW_EXPIRED_RETENTION,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryCacheStore::new()))
    }

    /// Store backed by the cache selected through the environment
    pub async fn from_env() -> Result<Self, FlowError> {
        Ok(Self::new(cache_store_from_env().await?))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// How long expired contexts stay loadable as expired
    pub fn with_expired_retention(mut self, retention: std::time::Duration) -> Self {
        self.retention = retention.as_secs();
        self
    }

    /// Cache ttl for `context`: its remaining lifetime plus the retention window
    fn cache_ttl(&self, context: &FlowContext, now: chrono::DateTime<Utc>) -> usize {
        (context.remaining_ttl(now) + self.retention).max(1) as usize
    }

    /// Creates and stores a new context for `definition`
    pub async fn create(&self, definition: &FlowDefinition) -> Result<FlowContext, FlowError> {
        let attempts = *FLOW_ID_COLLISION_ATTEMPTS;
        let mut cache = self.cache.lock().await;

        for _ in 0..attempts {
            let context = FlowContext::new(definition);
            let key = context.flow_id().to_string();
            let ttl = self.cache_ttl(&context, Utc::now());
            let data = CacheData::try_from(&context)?;

            if cache.put_if_not_exists(&self.prefix, &key, data, ttl).await? {
                tracing::info!(
                    flow_id = %context.flow_id(),
                    flow = definition.path(),
                    "Created flow"
                );
                return Ok(context);
            }
            tracing::warn!("Flow id collision on {}, retrying", key);
        }

        Err(StorageError::Storage(format!(
            "Could not allocate a unique flow id after {attempts} attempts"
        ))
        .into())
    }

    /// Loads a context; expired contexts are removed and reported as expired
    pub async fn load(&self, flow_id: Uuid) -> Result<FlowContext, FlowError> {
        let key = flow_id.to_string();
        let mut cache = self.cache.lock().await;

        let Some(data) = cache.get(&self.prefix, &key).await? else {
            return Err(FlowError::NotFound { flow_id });
        };
        let context = FlowContext::try_from(data)?;

        if context.is_expired(Utc::now()) {
            tracing::warn!("Removing expired flow {}", flow_id);
            cache.remove(&self.prefix, &key).await?;
            return Err(FlowError::Expired { flow_id });
        }

        Ok(context)
    }

    /// Stores `context` if the stored copy is still at `expected_version`
    ///
    /// Returns the committed context carrying its new version.
    pub async fn commit(
        &self,
        context: &FlowContext,
        expected_version: u64,
    ) -> Result<FlowContext, FlowError> {
        let flow_id = context.flow_id();
        let key = flow_id.to_string();
        let conflict = || FlowError::PersistenceConflict {
            flow_id,
            expected_version,
        };
        let mut cache = self.cache.lock().await;

        // A missing entry means another writer finished or removed the flow
        let Some(current) = cache.get(&self.prefix, &key).await? else {
            return Err(conflict().log());
        };
        let stored = FlowContext::try_from(current.clone())?;
        if stored.version() != expected_version {
            return Err(conflict().log());
        }

        let committed = context.clone().with_version(expected_version + 1);
        let now = Utc::now();
        if committed.is_expired(now) {
            cache.remove(&self.prefix, &key).await?;
            return Err(FlowError::Expired { flow_id });
        }
        let ttl = self.cache_ttl(&committed, now);

        let data = CacheData::try_from(&committed)?;
        if !cache
            .compare_and_swap(&self.prefix, &key, &current, data, ttl)
            .await?
        {
            return Err(conflict().log());
        }

        tracing::debug!(
            "Committed flow {} at version {} in state {}",
            flow_id,
            committed.version(),
            committed.current_state()
        );
        Ok(committed)
    }

    /// Deletes a context, for instance once it reached its end state
    pub async fn remove(&self, flow_id: Uuid) -> Result<(), FlowError> {
        let mut cache = self.cache.lock().await;
        cache.remove(&self.prefix, &flow_id.to_string()).await?;
        tracing::debug!("Removed flow {}", flow_id);
        Ok(())
    }
}
