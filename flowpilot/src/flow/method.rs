//! Pluggable step logic
//!
//! A [`Method`] is one action a client can invoke while a flow is in a given state.
//! When a definition is built every method is captured into a [`Transition`], which
//! freezes its name, input schema and legal target states.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::flow::errors::{ErrorType, FlowError};
use crate::flow::input::{Input, InputData, PublicInput};
use crate::flow::stash::Stash;
use crate::flow::types::{ActionName, StateName};

/// Business logic for one flow action
#[async_trait]
pub trait Method: Send + Sync + 'static {
    fn name(&self) -> ActionName;

    /// Input fields the action expects, in display order
    fn inputs(&self) -> Vec<Input> {
        Vec::new()
    }

    /// States the action may transition to
    fn allowed_targets(&self) -> Vec<StateName>;

    async fn execute(&self, ctx: &mut MethodContext<'_>) -> Result<MethodOutcome, MethodError>;
}

/// What a method sees while it runs
pub struct MethodContext<'a> {
    flow_id: Uuid,
    state: &'a StateName,
    input: &'a InputData,
    stash: &'a mut Stash,
}

impl<'a> MethodContext<'a> {
    pub fn new(
        flow_id: Uuid,
        state: &'a StateName,
        input: &'a InputData,
        stash: &'a mut Stash,
    ) -> Self {
        Self {
            flow_id,
            state,
            input,
            stash,
        }
    }

    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    pub fn current_state(&self) -> &StateName {
        self.state
    }

    /// Validated input submitted with the action
    pub fn input(&self) -> &InputData {
        self.input
    }

    pub fn stash(&self) -> &Stash {
        &*self.stash
    }

    pub fn stash_mut(&mut self) -> &mut Stash {
        &mut *self.stash
    }
}

/// Successful result of a method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOutcome {
    pub next_state: StateName,
    pub payload: Option<Value>,
}

impl MethodOutcome {
    pub fn transition(next_state: StateName) -> Self {
        Self {
            next_state,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Failure reported by a method
#[derive(Debug, Error)]
pub enum MethodError {
    /// The client may retry; the flow stays in its current state
    #[error("{error}")]
    Recoverable {
        error: ErrorType,
        field: Option<String>,
    },

    /// The flow cannot continue and is moved to the error state
    #[error("{error}{}", .cause.as_ref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Fatal {
        error: ErrorType,
        cause: Option<String>,
    },
}

impl MethodError {
    pub fn recoverable(error: impl Into<ErrorType>) -> Self {
        Self::Recoverable {
            error: error.into(),
            field: None,
        }
    }

    /// Recoverable error attributed to one input field
    pub fn recoverable_field(field: impl Into<String>, error: impl Into<ErrorType>) -> Self {
        Self::Recoverable {
            error: error.into(),
            field: Some(field.into()),
        }
    }

    pub fn fatal(error: impl Into<ErrorType>) -> Self {
        Self::Fatal {
            error: error.into(),
            cause: None,
        }
    }

    pub fn fatal_with_cause(error: impl Into<ErrorType>, cause: impl fmt::Display) -> Self {
        Self::Fatal {
            error: error.into(),
            cause: Some(cause.to_string()),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

/// A method registered on a state, with its schema captured at build time
#[derive(Clone)]
pub struct Transition {
    name: ActionName,
    inputs: Vec<Input>,
    allowed_targets: BTreeSet<StateName>,
    method: Arc<dyn Method>,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("allowed_targets", &self.allowed_targets)
            .finish_non_exhaustive()
    }
}

impl Transition {
    pub(crate) fn from_method(method: Arc<dyn Method>) -> Self {
        Self {
            name: method.name(),
            inputs: method.inputs(),
            allowed_targets: method.allowed_targets().into_iter().collect(),
            method,
        }
    }

    pub fn name(&self) -> &ActionName {
        &self.name
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn allowed_targets(&self) -> &BTreeSet<StateName> {
        &self.allowed_targets
    }

    pub fn allows(&self, target: &StateName) -> bool {
        self.allowed_targets.contains(target)
    }

    pub(crate) fn method(&self) -> &dyn Method {
        self.method.as_ref()
    }

    /// Validates every input; returns the per-field errors, empty when all pass
    pub fn validate(
        &self,
        state: &StateName,
        data: &InputData,
        stash: &Stash,
    ) -> BTreeMap<String, ErrorType> {
        self.inputs
            .iter()
            .filter_map(|input| {
                input
                    .validate(state, data, stash)
                    .err()
                    .map(|error| (input.name().to_string(), error))
            })
            .collect()
    }

    /// Copies submitted values of persisted inputs into the stash
    pub(crate) fn persist_inputs(
        &self,
        state: &StateName,
        data: &InputData,
        stash: &mut Stash,
    ) -> Result<(), FlowError> {
        for input in &self.inputs {
            if !input.should_persist() || !input.is_included_on_state(state) {
                continue;
            }
            if let Some(value) = data.get(input.name()) {
                stash.set(input.name(), value.clone())?;
            }
        }
        Ok(())
    }

    /// Public view of the inputs included on `state`
    pub fn public_inputs(
        &self,
        state: &StateName,
        submitted: Option<&InputData>,
        field_errors: Option<&BTreeMap<String, ErrorType>>,
    ) -> Vec<PublicInput> {
        self.inputs
            .iter()
            .filter(|input| input.is_included_on_state(state))
            .map(|input| {
                let value = submitted.and_then(|data| data.get(input.name()));
                let error = field_errors.and_then(|errors| errors.get(input.name()).cloned());
                input.to_public(value, error)
            })
            .collect()
    }
}
