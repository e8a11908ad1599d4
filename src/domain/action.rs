//! Action requests produced by the reasoning engine and their outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single action the reasoning engine asked us to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Correlation id assigned by the engine (echoed back with the outcome)
    pub id: String,

    /// Action name from the catalog
    pub name: String,

    /// Loosely-typed arguments, decoded per action at dispatch time
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ActionRequest {
    /// Create a request
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Build a request from a JSON object literal (non-objects become empty arguments)
    pub fn from_json(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, name, arguments)
    }
}

/// Result of executing one request, in request order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Action name as requested
    #[serde(rename = "function")]
    pub name: String,

    /// Arguments as requested
    pub arguments: Map<String, Value>,

    /// Human-readable result (success text or error description)
    pub result: String,
}

impl ActionOutcome {
    pub fn new(request: &ActionRequest, result: String) -> Self {
        Self {
            name: request.name.clone(),
            arguments: request.arguments.clone(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serializes_name_as_function() {
        let request = ActionRequest::from_json("call_1", "readNote", json!({"notePath": "Work/a.md"}));
        let outcome = ActionOutcome::new(&request, "ok".to_string());

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["function"], "readNote");
        assert_eq!(value["arguments"]["notePath"], "Work/a.md");
        assert_eq!(value["result"], "ok");
    }

    #[test]
    fn test_non_object_arguments_become_empty() {
        let request = ActionRequest::from_json("call_1", "listNotes", json!("garbage"));
        assert!(request.arguments.is_empty());
    }
}
