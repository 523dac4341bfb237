use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::flow::{FlowDefinition, FlowError};

/// Flow definitions by path
#[derive(Debug, Default)]
pub struct FlowRegistry {
    definitions: RwLock<HashMap<String, Arc<FlowDefinition>>>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `definition` under its path, replacing any earlier definition
    pub async fn register(&self, definition: FlowDefinition) -> Arc<FlowDefinition> {
        let definition = Arc::new(definition);
        let previous = self
            .definitions
            .write()
            .await
            .insert(definition.path().to_string(), definition.clone());

        if previous.is_some() {
            tracing::info!("Replaced flow definition {}", definition.path());
        } else {
            tracing::info!("Registered flow definition {}", definition.path());
        }
        definition
    }

    pub async fn get(&self, path: &str) -> Result<Arc<FlowDefinition>, FlowError> {
        self.definitions
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| FlowError::UnknownFlow(path.to_string()))
    }

    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.definitions.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}
