//! Declarative input fields and their validation
//!
//! An [`Input`] is configured once with a fluent builder when a flow is defined and
//! is never mutated afterwards. Validation results and submitted values are produced
//! per request and only live in the rendered [`PublicInput`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::flow::errors::{ErrorCode, ErrorType, FlowError};
use crate::flow::stash::Stash;
use crate::flow::types::StateName;

/// Type of an input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    String,
    Email,
    Number,
    Password,
    Json,
}

/// Definition of a single input field expected by a method
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    name: String,
    data_type: InputType,
    min_length: Option<usize>,
    max_length: Option<usize>,
    required: Option<bool>,
    hidden: Option<bool>,
    preserve_value: bool,
    persist_value: bool,
    include_on_states: Vec<StateName>,
    compare_with_stash: bool,
}

/// Client-facing view of an input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicInput {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: InputType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorType>,
}

impl Input {
    fn new(name: impl Into<String>, data_type: InputType, persist_value: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            min_length: None,
            max_length: None,
            required: None,
            hidden: None,
            preserve_value: false,
            persist_value,
            include_on_states: Vec::new(),
            compare_with_stash: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, InputType::String, true)
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, InputType::Email, true)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, InputType::Number, true)
    }

    pub fn password(name: impl Into<String>) -> Self {
        Self::new(name, InputType::Password, false)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, InputType::Json, false)
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    /// Echo the submitted value back in the response instead of blanking it out
    pub fn preserve(mut self, preserve: bool) -> Self {
        self.preserve_value = preserve;
        self
    }

    /// Write the submitted value into the stash under the input name
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist_value = persist;
        self
    }

    /// Only include (and validate) this field while the flow is in one of `states`
    pub fn conditional_include_on_states(
        mut self,
        states: impl IntoIterator<Item = StateName>,
    ) -> Self {
        self.include_on_states = states.into_iter().collect();
        self
    }

    /// Require the submitted value to match the stash value stored under the input name
    pub fn compare_with_stash(mut self, compare: bool) -> Self {
        self.compare_with_stash = compare;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> InputType {
        self.data_type
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn should_persist(&self) -> bool {
        self.persist_value
    }

    pub fn should_preserve(&self) -> bool {
        self.preserve_value
    }

    pub fn is_included_on_state(&self, state: &StateName) -> bool {
        self.include_on_states.is_empty() || self.include_on_states.contains(state)
    }

    /// Validates the submitted value for this field
    ///
    /// Rules are applied in a fixed order and the first failing rule decides the
    /// error code.
    pub fn validate(
        &self,
        state: &StateName,
        data: &InputData,
        stash: &Stash,
    ) -> Result<(), ErrorType> {
        if !self.is_included_on_state(state) {
            return Ok(());
        }

        let input_value = data.get_text(&self.name).filter(|v| !v.is_empty());

        if self.is_required() && input_value.is_none() {
            return Err(ErrorType::new(ErrorCode::ValueMissing));
        }

        if self.compare_with_stash {
            let stash_value = stash.get(&self.name).and_then(value_as_text);
            if let (Some(submitted), Some(stashed)) = (&input_value, &stash_value) {
                if submitted != stashed {
                    return Err(ErrorType::new(ErrorCode::ValueInvalid));
                }
            }
        }

        if self.data_type == InputType::Json {
            return Ok(());
        }

        let Some(value) = input_value else {
            return Ok(());
        };
        let length = value.chars().count();

        if let Some(min_length) = self.min_length {
            if length < min_length {
                return Err(ErrorType::new(ErrorCode::ValueTooShort));
            }
        }

        if let Some(max_length) = self.max_length {
            if length > max_length {
                return Err(ErrorType::new(ErrorCode::ValueTooLong));
            }
        }

        if self.data_type == InputType::Email && !is_valid_email(&value) {
            return Err(ErrorType::new(ErrorCode::EmailInvalid));
        }

        Ok(())
    }

    /// Client-facing projection; `value` is only kept for preserved fields
    pub fn to_public(&self, value: Option<&Value>, error: Option<ErrorType>) -> PublicInput {
        PublicInput {
            name: self.name.clone(),
            data_type: self.data_type,
            value: value
                .filter(|_| self.preserve_value)
                .filter(|v| !v.is_null())
                .cloned(),
            min_length: self.min_length,
            max_length: self.max_length,
            required: self.required,
            hidden: self.hidden,
            error,
        }
    }
}

/// Data submitted by the client for one action invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputData(Map<String, Value>);

impl InputData {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_value(value: Value) -> Result<Self, FlowError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            _ => Err(FlowError::Stash(
                "submitted input data must be a JSON object".to_string(),
            )),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Submitted value as text; numbers and booleans are stringified
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(value_as_text)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for InputData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Conventional `local@domain.tld` check
pub(crate) fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
        && !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}
