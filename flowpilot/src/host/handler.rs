use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flow::{
    ActionName, ExecutionOutcome, FlowDefinition, FlowEngine, FlowError, FlowResponse, FlowStore,
    InputData,
};

use super::registry::FlowRegistry;

/// One action invocation as received from a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRequest {
    pub flow_id: Uuid,
    pub action: ActionName,
    #[serde(default)]
    pub data: InputData,
}

/// Response sent back to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResponse {
    pub flow_id: Uuid,
    #[serde(flatten)]
    pub response: FlowResponse,
}

/// Runs flows on behalf of a request handler
///
/// Each invocation loads the context, executes the action and commits the result
/// against the version it loaded, so concurrent invocations on one flow cannot both
/// apply a transition.
pub struct FlowHost {
    registry: FlowRegistry,
    engine: FlowEngine,
    store: FlowStore,
}

impl FlowHost {
    pub fn new(store: FlowStore) -> Self {
        Self {
            registry: FlowRegistry::new(),
            engine: FlowEngine::default(),
            store,
        }
    }

    pub fn with_engine(mut self, engine: FlowEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn registry(&self) -> &FlowRegistry {
        &self.registry
    }

    pub fn store(&self) -> &FlowStore {
        &self.store
    }

    /// Registers a flow definition; see [`FlowRegistry::register`]
    pub async fn register(&self, definition: FlowDefinition) {
        self.registry.register(definition).await;
    }

    /// Starts a new flow of the definition registered under `path`
    pub async fn start(&self, path: &str) -> Result<HostResponse, FlowError> {
        let definition = self.registry.get(path).await.map_err(FlowError::log)?;
        let context = self
            .store
            .create(&definition)
            .await
            .map_err(FlowError::log)?;
        let response = self.engine.render(&definition, &context)?;

        Ok(HostResponse {
            flow_id: context.flow_id(),
            response,
        })
    }

    /// Executes one action and commits the outcome
    #[tracing::instrument(skip(self, request), fields(flow_id = %request.flow_id, action = %request.action))]
    pub async fn invoke(&self, request: FlowRequest) -> Result<HostResponse, FlowError> {
        let FlowRequest {
            flow_id,
            action,
            data,
        } = request;

        let context = self.store.load(flow_id).await.map_err(FlowError::log)?;
        let definition = self
            .registry
            .get(context.definition_path())
            .await
            .map_err(FlowError::log)?;

        let execution = self
            .engine
            .execute(&definition, &context, &action, data)
            .await
            .map_err(FlowError::log)?;

        let committed = self
            .store
            .commit(&execution.context, context.version())
            .await?;

        if committed.current_state() == definition.end_state() {
            tracing::info!("Flow {} completed", flow_id);
            self.store.remove(flow_id).await.map_err(FlowError::log)?;
        } else if execution.outcome == ExecutionOutcome::Failed {
            tracing::info!("Flow {} moved to its error state", flow_id);
        }

        Ok(HostResponse {
            flow_id,
            response: execution.response,
        })
    }

    /// Current view of a flow; nothing is executed or committed
    pub async fn current(&self, flow_id: Uuid) -> Result<HostResponse, FlowError> {
        let context = self.store.load(flow_id).await.map_err(FlowError::log)?;
        let definition = self
            .registry
            .get(context.definition_path())
            .await
            .map_err(FlowError::log)?;
        let response = self.engine.render(&definition, &context)?;

        Ok(HostResponse { flow_id, response })
    }
}
