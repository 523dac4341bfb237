use async_trait::async_trait;
use uuid::Uuid;

use crate::flow::errors::ErrorType;
use crate::flow::types::{ActionName, StateName};

/// Details of a method failure that forced a flow into its error state
#[derive(Debug, Clone)]
pub struct FatalFailure<'a> {
    pub flow_id: Uuid,
    pub definition_path: &'a str,
    pub state: &'a StateName,
    pub action: &'a ActionName,
    pub error: &'a ErrorType,
    pub cause: Option<&'a str>,
}

/// Receives audit events emitted by the engine
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    async fn fatal_failure(&self, event: &FatalFailure<'_>);
}

/// Audit sink that writes events to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn fatal_failure(&self, event: &FatalFailure<'_>) {
        tracing::warn!(
            flow_id = %event.flow_id,
            flow = event.definition_path,
            state = %event.state,
            action = %event.action,
            code = ?event.error.code,
            cause = event.cause.unwrap_or_default(),
            "Flow method failed fatally"
        );
    }
}
