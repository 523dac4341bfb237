use std::collections::BTreeMap;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::flow::types::{ActionName, StateName};
use crate::storage::StorageError;

/// Client-facing error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "value_missing_error")]
    ValueMissing,
    #[serde(rename = "value_invalid_error")]
    ValueInvalid,
    #[serde(rename = "value_too_short_error")]
    ValueTooShort,
    #[serde(rename = "value_too_long_error")]
    ValueTooLong,
    #[serde(rename = "email_invalid_error")]
    EmailInvalid,
    #[serde(rename = "form_data_invalid_error")]
    FormDataInvalid,
    #[serde(rename = "invalid_action_error")]
    InvalidAction,
    #[serde(rename = "flow_expired_error")]
    FlowExpired,
    #[serde(rename = "operation_not_permitted_error")]
    OperationNotPermitted,
    #[serde(rename = "technical_error")]
    Technical,
    #[serde(rename = "unknown_user_error")]
    UnknownUser,
    #[serde(rename = "persistence_conflict_error")]
    PersistenceConflict,
}

impl ErrorCode {
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValueMissing => "The value is missing.",
            Self::ValueInvalid => "The value is invalid.",
            Self::ValueTooShort => "The value is too short.",
            Self::ValueTooLong => "The value is too long.",
            Self::EmailInvalid => "The email address is invalid.",
            Self::FormDataInvalid => "Form data invalid.",
            Self::InvalidAction => "The action is not valid in the current state.",
            Self::FlowExpired => "The flow has expired.",
            Self::OperationNotPermitted => "The operation is not permitted.",
            Self::Technical => "Something went wrong.",
            Self::UnknownUser => "The user does not exist.",
            Self::PersistenceConflict => "The flow was modified concurrently.",
        }
    }
}

/// An error code paired with a human readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorType {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorType {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ErrorCode> for ErrorType {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Error information attached to a flow context and rendered in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(flatten)]
    pub error: ErrorType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, ErrorType>,
}

impl ErrorInfo {
    pub fn new(error: impl Into<ErrorType>) -> Self {
        Self {
            error: error.into(),
            field_errors: BTreeMap::new(),
        }
    }

    pub fn with_field_errors(
        error: impl Into<ErrorType>,
        field_errors: BTreeMap<String, ErrorType>,
    ) -> Self {
        Self {
            error: error.into(),
            field_errors,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.error.code
    }
}

/// Errors that abort a flow operation instead of producing a response
#[derive(Debug, Error)]
pub enum FlowError {
    /// Invalid flow definition detected while building
    #[error("Invalid flow definition: {0}")]
    Definition(String),

    /// The flow has passed its expiry time
    #[error("Flow {flow_id} has expired")]
    Expired { flow_id: Uuid },

    /// No flow with the given id exists
    #[error("Flow {flow_id} not found")]
    NotFound { flow_id: Uuid },

    /// No definition is registered under the given path
    #[error("No flow definition registered for path {0}")]
    UnknownFlow(String),

    /// The context belongs to a different definition
    #[error("Flow context for {context_path} used with definition {definition_path}")]
    DefinitionMismatch {
        context_path: String,
        definition_path: String,
    },

    /// The context's current state is not declared in the definition
    #[error("State {0} is not part of the flow definition")]
    UnknownState(StateName),

    /// A method returned a state it did not declare as a target
    #[error("Action {action} in state {state} returned undeclared target state {target}")]
    TransitionInvariant {
        state: StateName,
        action: ActionName,
        target: StateName,
    },

    /// Another writer committed the same flow first
    #[error("Flow {flow_id} was modified concurrently (expected version {expected_version})")]
    PersistenceConflict { flow_id: Uuid, expected_version: u64 },

    /// Error from the stash document
    #[error("Stash error: {0}")]
    Stash(String),

    /// Error converting between data formats using Serde
    #[error("Json conversion(Serde) error: {0}")]
    Serde(String),

    /// Error from the underlying storage
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

impl FlowError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::TransitionInvariant { .. } | Self::Definition(_) => {
                tracing::error!("Flow defect: {}", self)
            }
            Self::Storage(err) => tracing::error!("Flow storage error: {}", err),
            Self::Stash(msg) => tracing::error!("Stash error: {}", msg),
            Self::Serde(msg) => tracing::error!("Json conversion(Serde) error: {}", msg),
            Self::PersistenceConflict { .. } => tracing::warn!("{}", self),
            Self::Expired { .. } | Self::NotFound { .. } => tracing::debug!("{}", self),
            Self::UnknownFlow(_) | Self::DefinitionMismatch { .. } | Self::UnknownState(_) => {
                tracing::warn!("{}", self)
            }
        }
        self
    }

    /// HTTP status a host should answer with for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Expired { .. } => StatusCode::GONE,
            Self::NotFound { .. } | Self::UnknownFlow(_) => StatusCode::NOT_FOUND,
            Self::PersistenceConflict { .. } => StatusCode::CONFLICT,
            Self::DefinitionMismatch { .. } | Self::UnknownState(_) => StatusCode::BAD_REQUEST,
            Self::Definition(_)
            | Self::TransitionInvariant { .. }
            | Self::Stash(_)
            | Self::Serde(_)
            | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing error body for this error
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::Expired { .. } => ErrorType::new(ErrorCode::FlowExpired),
            Self::PersistenceConflict { .. } => ErrorType::new(ErrorCode::PersistenceConflict),
            Self::NotFound { .. } | Self::UnknownFlow(_) => {
                ErrorType::with_message(ErrorCode::OperationNotPermitted, "Flow not found.")
            }
            _ => ErrorType::new(ErrorCode::Technical),
        }
    }
}
