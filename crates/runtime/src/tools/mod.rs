//! Tool execution and MCP integration.

mod empty;
pub mod errors;
mod host;
mod mcp_client;
mod mcp_host;
mod types;

pub use empty::EmptyToolHost;
pub use errors::ToolError;
pub use host::ToolHost;
pub use mcp_client::{CLIENT_KEY_VAR, McpClient, McpError, ServerConfig};
pub use mcp_host::McpToolHost;
pub use types::{ToolArguments, ToolOutput};
