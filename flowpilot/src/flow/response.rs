use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::flow::errors::ErrorInfo;
use crate::flow::input::PublicInput;
use crate::flow::types::{ActionName, StateName};

/// An action available in the current state, with the inputs it expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicAction {
    pub action: ActionName,
    pub inputs: Vec<PublicInput>,
}

/// Client-facing view of a flow after an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResponse {
    pub state: StateName,
    pub actions: Vec<PublicAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl FlowResponse {
    pub fn action(&self, name: &str) -> Option<&PublicAction> {
        self.actions.iter().find(|action| action.action.as_str() == name)
    }
}

impl PublicAction {
    pub fn input(&self, name: &str) -> Option<&PublicInput> {
        self.inputs.iter().find(|input| input.name == name)
    }
}
