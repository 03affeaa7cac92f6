//! Empty tool host implementation.

use crate::model::{ToolCall, ToolSpec};
use crate::tools::{ToolError, ToolHost, ToolOutput};

/// A tool host with no tools.
///
/// Lets the agent run as a plain chat loop; any call the model invents is
/// reported as not found.
#[derive(Debug, Default)]
pub struct EmptyToolHost;

impl ToolHost for EmptyToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &[]
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        Err(ToolError::NotFound(call.name.clone()))
    }
}
