//! MCP server adapter exposing a [`WeatherHost`] over rmcp.

use std::sync::Arc;

use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};

use crate::catalog::ToolDeclaration;
use crate::host::{ToolOutput, WeatherHost};
use crate::provider::WeatherSource;

const INSTRUCTIONS: &str = "Weather lookups: current conditions by city or coordinates, \
                            and a 5-day forecast by city.";

/// rmcp handler wrapping a weather host.
pub struct WeatherServer<S> {
    host: Arc<WeatherHost<S>>,
}

impl<S> WeatherServer<S> {
    pub fn new(host: WeatherHost<S>) -> Self {
        Self {
            host: Arc::new(host),
        }
    }
}

impl<S> Clone for WeatherServer<S> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl From<ToolDeclaration> for Tool {
    fn from(decl: ToolDeclaration) -> Self {
        Tool::new(decl.name, decl.description, Arc::new(decl.input_schema))
    }
}

impl From<ToolOutput> for CallToolResult {
    fn from(output: ToolOutput) -> Self {
        let content = vec![Content::text(output.text)];
        if output.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

impl<S> ServerHandler for WeatherServer<S>
where
    S: WeatherSource + 'static,
{
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self
            .host
            .declarations()
            .into_iter()
            .map(Tool::from)
            .collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let output = self
            .host
            .call(&request.name, request.arguments.as_ref())
            .await;
        Ok(output.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WeatherTool;

    #[test]
    fn declarations_convert_to_protocol_tools() {
        let tool = Tool::from(WeatherTool::CurrentWeather.declaration());
        assert_eq!(tool.name, "get_current_weather");
        assert_eq!(
            tool.description.as_deref(),
            Some("Get current weather conditions for a city")
        );
        assert_eq!(tool.input_schema["required"], serde_json::json!(["city"]));
    }

    #[test]
    fn outputs_convert_with_error_flag() {
        let ok = CallToolResult::from(ToolOutput::success("sunny"));
        assert_eq!(ok.is_error, Some(false));

        let err = CallToolResult::from(ToolOutput::error("Unknown tool: x"));
        assert_eq!(err.is_error, Some(true));
        assert_eq!(err.content.len(), 1);
    }
}
