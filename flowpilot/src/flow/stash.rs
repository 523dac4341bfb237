//! Cross-step data carried by a flow context
//!
//! The stash is a JSON object addressed by dotted paths (`sticky.passcode_id`).
//! Writes overwrite whatever is stored under the path; there is no history.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::flow::errors::FlowError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stash(Value);

impl Default for Stash {
    fn default() -> Self {
        Self::new()
    }
}

impl Stash {
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Builds a stash from an existing document, which must be a JSON object
    pub fn from_value(value: Value) -> Result<Self, FlowError> {
        match value {
            Value::Object(_) => Ok(Self(value)),
            Value::Null => Ok(Self::new()),
            other => Err(FlowError::Stash(format!(
                "stash document must be an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.0;
        for segment in split_path(path) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        match current {
            Value::Null => None,
            value => Some(value),
        }
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Writes `value` under `path`, creating or replacing intermediate objects
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), FlowError> {
        let segments: Vec<&str> = split_path(path).collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(FlowError::Stash("empty stash path".to_string()));
        };

        let mut current = self.root_mut();
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("intermediate stash entries are objects"),
            };
        }
        current.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Removes the value under `path`, returning it if it existed
    pub fn delete(&mut self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = split_path(path).collect();
        let (last, parents) = segments.split_last()?;

        let mut current = self.root_mut();
        for segment in parents {
            current = current.get_mut(*segment)?.as_object_mut()?;
        }
        current.remove(*last)
    }

    /// Deep-merges `document` into the stash; scalars and arrays overwrite
    pub fn merge(&mut self, document: Value) -> Result<(), FlowError> {
        let Value::Object(incoming) = document else {
            return Err(FlowError::Stash(format!(
                "only objects can be merged into the stash, got {}",
                json_kind(&document)
            )));
        };
        merge_objects(self.root_mut(), incoming);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_object().is_none_or(Map::is_empty)
    }

    #[cfg(test)]
    pub(crate) fn as_value(&self) -> &Value {
        &self.0
    }

    fn root_mut(&mut self) -> &mut Map<String, Value> {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        match &mut self.0 {
            Value::Object(map) => map,
            _ => unreachable!("stash root is an object"),
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

fn merge_objects(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge_objects(existing, nested)
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
