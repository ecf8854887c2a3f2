//! The tool surface exposed to an agent framework.
//!
//! A tool call is a name plus a JSON argument object. The registry checks the
//! arguments against the tool's schema, the executor coerces them, runs the
//! calculator and renders the result as text for the model alongside the
//! structured data.

mod args;
mod definitions;
mod executor;
mod registry;

pub use args::{coerce_number, coerce_whole};
pub use definitions::{all_definitions, ToolDefinition, ToolKind};
pub use executor::ToolExecutor;
pub use registry::ToolRegistry;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::RuntimeError;

/// A tool invocation as emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub name: String,

    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    /// Name of the tool that was called
    pub tool: String,

    pub is_error: bool,

    /// Text handed back to the model
    pub text: String,

    /// Structured result
    pub data: Value,
}

impl ToolOutput {
    pub fn success(kind: ToolKind, text: String, data: Value) -> Self {
        Self {
            tool: kind.to_string(),
            is_error: false,
            text,
            data,
        }
    }

    pub fn failure(tool: &str, err: &RuntimeError) -> Self {
        Self {
            tool: tool.to_string(),
            is_error: true,
            text: format!("ERROR: {}", err),
            data: json!({ "error": err.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_arguments_default_to_null() {
        let call: ToolCall = serde_json::from_str(r#"{"name": "get_room_summary"}"#).unwrap();
        assert_eq!(call.name, "get_room_summary");
        assert!(call.arguments.is_null());
    }

    #[test]
    fn test_failure_output() {
        let err = RuntimeError::UnknownTool("order_pizza".to_string());
        let output = ToolOutput::failure("order_pizza", &err);

        assert!(output.is_error);
        assert_eq!(output.text, "ERROR: Unknown tool: order_pizza");
        assert_eq!(output.data["error"], "Unknown tool: order_pizza");
    }
}
