use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flow::definition::FlowDefinition;
use crate::flow::errors::{ErrorInfo, FlowError};
use crate::flow::stash::Stash;
use crate::flow::types::StateName;
use crate::storage::CacheData;

/// Persisted instance of a running flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowContext {
    flow_id: Uuid,
    definition_path: String,
    current_state: StateName,
    stash: Stash,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_info: Option<ErrorInfo>,
}

impl FlowContext {
    /// Creates a context in the definition's initial state
    pub fn new(definition: &FlowDefinition) -> Self {
        let created_at = Utc::now();
        let ttl = Duration::from_std(definition.ttl()).unwrap_or(Duration::MAX);
        Self {
            flow_id: Uuid::new_v4(),
            definition_path: definition.path().to_string(),
            current_state: definition.initial_state().clone(),
            stash: Stash::new(),
            created_at,
            expires_at: created_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            version: 0,
            error_info: None,
        }
    }

    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    pub fn definition_path(&self) -> &str {
        &self.definition_path
    }

    pub fn current_state(&self) -> &StateName {
        &self.current_state
    }

    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn error_info(&self) -> Option<&ErrorInfo> {
        self.error_info.as_ref()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Seconds left before the context expires, rounded up; zero when already expired
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.expires_at - now).num_milliseconds().max(0) as u64;
        millis.div_ceil(1000)
    }

    /// Produces the successor context after an action has been handled
    pub(crate) fn advance(
        &self,
        next_state: StateName,
        stash: Stash,
        error_info: Option<ErrorInfo>,
    ) -> Self {
        Self {
            current_state: next_state,
            stash,
            error_info,
            ..self.clone()
        }
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = expires_at;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_stash(mut self, stash: Stash) -> Self {
        self.stash = stash;
        self
    }
}

impl TryFrom<&FlowContext> for CacheData {
    type Error = FlowError;

    fn try_from(context: &FlowContext) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(context)?,
        })
    }
}

impl TryFrom<CacheData> for FlowContext {
    type Error = FlowError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        Ok(serde_json::from_str(&data.value)?)
    }
}
