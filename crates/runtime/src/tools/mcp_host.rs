//! MCP-backed tool host.

use super::{McpClient, McpError, ServerConfig, ToolArguments, ToolError, ToolHost, ToolOutput};
use crate::model::{ToolCall, ToolSpec};
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;
use tracing::info;

/// Tool host backed by an MCP server.
///
/// Tool specs are fetched once at spawn and cached for the session.
pub struct McpToolHost {
    client: McpClient,
    specs: Vec<ToolSpec>,
}

impl McpToolHost {
    /// Spawn MCP server and cache tool specs.
    pub async fn spawn(config: &ServerConfig) -> Result<Self, McpError> {
        let client = McpClient::spawn(config).await?;
        let specs: Vec<ToolSpec> = client
            .list_tools()
            .await?
            .into_iter()
            .map(ToolSpec::from)
            .collect();

        info!(tools = specs.len(), "connected to tool server");
        Ok(Self { client, specs })
    }

    /// Shut down the underlying server.
    pub async fn shutdown(self) -> Result<(), McpError> {
        self.client.shutdown().await
    }
}

impl ToolHost for McpToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        let arguments = ToolArguments::try_from(call.input.clone())?;
        let result = self
            .client
            .call_tool(&call.name, arguments.0)
            .await
            .map_err(|e| ToolError::Transport(e.to_string()))?;

        Ok(ToolOutput::from(result))
    }
}

impl From<Tool> for ToolSpec {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
            schema: Value::Object((*tool.input_schema).clone()),
        }
    }
}

impl From<CallToolResult> for ToolOutput {
    fn from(result: CallToolResult) -> Self {
        Self {
            content: result
                .content
                .iter()
                .filter_map(|c| c.as_text().map(|t| t.text.clone()))
                .collect(),
            is_error: result.is_error.unwrap_or(false),
        }
    }
}
