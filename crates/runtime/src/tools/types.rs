//! Tool-related types.

use super::ToolError;
use serde_json::{Map, Value};

/// The text a tool host returned for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Text segments, in the order the host produced them.
    pub content: Vec<String>,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![text.into()],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![text.into()],
            is_error: true,
        }
    }

    /// All segments joined into one string.
    pub fn text(&self) -> String {
        self.content.join("")
    }
}

/// Call arguments in the shape MCP expects: absent, or a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(pub Option<Map<String, Value>>);

impl TryFrom<Value> for ToolArguments {
    type Error = ToolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self(None)),
            Value::Object(map) => Ok(Self(Some(map))),
            other => Err(ToolError::InvalidInput(format!(
                "tool arguments must be a JSON object, got {other}"
            ))),
        }
    }
}
