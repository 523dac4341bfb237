//! Execution engine
//!
//! [`FlowEngine::execute`] runs one action against one context and returns the successor
//! context together with the response view. It never persists anything; committing the
//! returned context is the caller's job.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::flow::audit::{AuditSink, FatalFailure, TracingAuditSink};
use crate::flow::context::FlowContext;
use crate::flow::definition::FlowDefinition;
use crate::flow::errors::{ErrorCode, ErrorInfo, ErrorType, FlowError};
use crate::flow::input::InputData;
use crate::flow::method::{MethodContext, MethodError, Transition};
use crate::flow::response::{FlowResponse, PublicAction};
use crate::flow::types::{ActionName, StateName};

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The method succeeded and the flow moved to the returned state
    Transitioned,
    /// The request was refused; state and stash are unchanged
    Rejected,
    /// The method failed fatally and the flow was forced into the error state
    Failed,
}

/// Result of one invocation
#[derive(Debug, Clone)]
pub struct Execution {
    pub context: FlowContext,
    pub response: FlowResponse,
    pub outcome: ExecutionOutcome,
}

/// Submitted values and field errors to echo back for one action
struct Resubmission<'a> {
    action: &'a ActionName,
    data: &'a InputData,
    field_errors: &'a BTreeMap<String, ErrorType>,
}

#[derive(Clone)]
pub struct FlowEngine {
    audit: Arc<dyn AuditSink>,
}

impl Default for FlowEngine {
    fn default() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }
}

impl FlowEngine {
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self { audit }
    }

    /// Runs `action` with `data` against `context`
    #[tracing::instrument(
        skip(self, definition, context, data),
        fields(flow_id = %context.flow_id(), state = %context.current_state())
    )]
    pub async fn execute(
        &self,
        definition: &FlowDefinition,
        context: &FlowContext,
        action: &ActionName,
        data: InputData,
    ) -> Result<Execution, FlowError> {
        let transition = match self.resolve(definition, context, action)? {
            Some(transition) => transition,
            None => {
                tracing::debug!("Action {} is not available", action);
                return Ok(self.reject(
                    definition,
                    context,
                    ErrorInfo::new(ErrorCode::InvalidAction),
                    None,
                ));
            }
        };
        let state = context.current_state();

        let field_errors = transition.validate(state, &data, context.stash());
        if !field_errors.is_empty() {
            tracing::debug!("Input validation failed for {} field(s)", field_errors.len());
            let resubmission = Resubmission {
                action,
                data: &data,
                field_errors: &field_errors,
            };
            return Ok(self.reject(
                definition,
                context,
                ErrorInfo::with_field_errors(ErrorCode::FormDataInvalid, field_errors.clone()),
                Some(resubmission),
            ));
        }

        // The callback works on a copy so a failed attempt leaves no trace
        let mut stash = context.stash().clone();
        transition.persist_inputs(state, &data, &mut stash)?;

        let result = {
            let mut method_ctx = MethodContext::new(context.flow_id(), state, &data, &mut stash);
            transition.method().execute(&mut method_ctx).await
        };

        match result {
            Ok(outcome) => {
                if !transition.allows(&outcome.next_state) {
                    tracing::error!(
                        "Action {} returned {} outside its allowed targets",
                        action,
                        outcome.next_state
                    );
                    return Err(FlowError::TransitionInvariant {
                        state: state.clone(),
                        action: action.clone(),
                        target: outcome.next_state,
                    });
                }

                tracing::debug!("Transition {} -> {}", state, outcome.next_state);
                let next = context.advance(outcome.next_state, stash, None);
                let response = self.render_state(
                    definition,
                    next.current_state(),
                    None,
                    outcome.payload,
                    None,
                );
                Ok(Execution {
                    context: next,
                    response,
                    outcome: ExecutionOutcome::Transitioned,
                })
            }
            Err(MethodError::Recoverable { error, field }) => {
                tracing::warn!("Action {} failed recoverably: {}", action, error);
                match field {
                    Some(field) => {
                        let mut field_errors = BTreeMap::new();
                        field_errors.insert(field, error.clone());
                        let resubmission = Resubmission {
                            action,
                            data: &data,
                            field_errors: &field_errors,
                        };
                        Ok(self.reject(
                            definition,
                            context,
                            ErrorInfo::with_field_errors(error, field_errors.clone()),
                            Some(resubmission),
                        ))
                    }
                    None => Ok(self.reject(definition, context, ErrorInfo::new(error), None)),
                }
            }
            Err(MethodError::Fatal { error, cause }) => {
                tracing::error!(
                    "Action {} failed fatally: {}",
                    action,
                    cause.as_deref().unwrap_or(error.message.as_str())
                );
                self.audit
                    .fatal_failure(&FatalFailure {
                        flow_id: context.flow_id(),
                        definition_path: definition.path(),
                        state,
                        action,
                        error: &error,
                        cause: cause.as_deref(),
                    })
                    .await;

                let mut stash = context.stash().clone();
                for path in definition.clear_on_fatal() {
                    stash.delete(path);
                }

                let error_info = ErrorInfo::new(error);
                let next = context.advance(
                    definition.error_state().clone(),
                    stash,
                    Some(error_info.clone()),
                );
                let response = self.render_state(
                    definition,
                    next.current_state(),
                    Some(error_info),
                    None,
                    None,
                );
                Ok(Execution {
                    context: next,
                    response,
                    outcome: ExecutionOutcome::Failed,
                })
            }
        }
    }

    /// Response view of `context` as it stands, without executing anything
    pub fn render(
        &self,
        definition: &FlowDefinition,
        context: &FlowContext,
    ) -> Result<FlowResponse, FlowError> {
        check_context(definition, context)?;
        Ok(self.render_state(
            definition,
            context.current_state(),
            context.error_info().cloned(),
            None,
            None,
        ))
    }

    /// Checks the context and finds the transition registered for `action`
    fn resolve<'d>(
        &self,
        definition: &'d FlowDefinition,
        context: &FlowContext,
        action: &ActionName,
    ) -> Result<Option<&'d Transition>, FlowError> {
        if context.is_expired(Utc::now()) {
            tracing::warn!("Flow {} has expired", context.flow_id());
            return Err(FlowError::Expired {
                flow_id: context.flow_id(),
            });
        }
        check_context(definition, context)?;
        Ok(definition.find_transition(context.current_state(), action))
    }

    fn reject(
        &self,
        definition: &FlowDefinition,
        context: &FlowContext,
        error_info: ErrorInfo,
        resubmission: Option<Resubmission<'_>>,
    ) -> Execution {
        let next = context.advance(
            context.current_state().clone(),
            context.stash().clone(),
            Some(error_info.clone()),
        );
        let response = self.render_state(
            definition,
            next.current_state(),
            Some(error_info),
            None,
            resubmission,
        );
        Execution {
            context: next,
            response,
            outcome: ExecutionOutcome::Rejected,
        }
    }

    fn render_state(
        &self,
        definition: &FlowDefinition,
        state: &StateName,
        error: Option<ErrorInfo>,
        payload: Option<Value>,
        resubmission: Option<Resubmission<'_>>,
    ) -> FlowResponse {
        let actions = definition
            .transitions(state)
            .unwrap_or_default()
            .iter()
            .map(|transition| {
                let echoed = resubmission
                    .as_ref()
                    .filter(|r| r.action == transition.name());
                PublicAction {
                    action: transition.name().clone(),
                    inputs: transition.public_inputs(
                        state,
                        echoed.map(|r| r.data),
                        echoed.map(|r| r.field_errors),
                    ),
                }
            })
            .collect();

        FlowResponse {
            state: state.clone(),
            actions,
            error,
            payload,
        }
    }
}

fn check_context(definition: &FlowDefinition, context: &FlowContext) -> Result<(), FlowError> {
    if context.definition_path() != definition.path() {
        return Err(FlowError::DefinitionMismatch {
            context_path: context.definition_path().to_string(),
            definition_path: definition.path().to_string(),
        });
    }
    if !definition.has_state(context.current_state()) {
        return Err(FlowError::UnknownState(context.current_state().clone()));
    }
    Ok(())
}
