//! MCP client connected to a tool server child process.
//!
//! Uses the rmcp SDK's child-process transport: the server is spawned with
//! piped stdio and speaks MCP over it. The client credential travels as an
//! environment variable of the child, never inside a request.
//!
//! # Example
//!
//! ```ignore
//! use runtime::tools::{McpClient, ServerConfig};
//!
//! # async fn example() -> Result<(), runtime::tools::McpError> {
//! let client = McpClient::spawn(&ServerConfig::new("weather-server")).await?;
//!
//! let tools = client.list_tools().await?;
//! for tool in &tools {
//!     println!("Tool: {}", tool.name);
//! }
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParams, CallToolResult, Tool},
    service::RunningService,
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Environment variable through which the client credential is handed over.
pub const CLIENT_KEY_VAR: &str = "MCP_CLIENT_API_KEY";

/// Error type for MCP operations.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("failed to spawn tool server: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to initialize tool server session: {0}")]
    Connect(String),

    #[error("tool server request failed: {0}")]
    Request(String),
}

/// How to launch a tool server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the child (it also inherits ours).
    pub env: HashMap<String, String>,
    /// Credential presented to the server, if any.
    pub api_key: Option<String>,
}

impl ServerConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// Environment entries set on the child, credential included.
    pub fn child_env(&self) -> HashMap<String, String> {
        let mut env = self.env.clone();
        if let Some(key) = &self.api_key {
            env.insert(CLIENT_KEY_VAR.to_string(), key.clone());
        }
        env
    }
}

/// An MCP client connected to a server process.
pub struct McpClient {
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Spawn an MCP server and run the initialize handshake.
    pub async fn spawn(config: &ServerConfig) -> Result<Self, McpError> {
        let env = config.child_env();
        debug!(command = %config.command, args = ?config.args, "spawning tool server");

        let transport = TokioChildProcess::new(Command::new(&config.command).configure(|cmd| {
            cmd.args(&config.args).envs(&env);
        }))?;

        let service = ()
            .serve(transport)
            .await
            .map_err(|e| McpError::Connect(e.to_string()))?;

        Ok(Self { service })
    }

    /// List available tools from the server.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, McpError> {
        let response = self
            .service
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Request(e.to_string()))?;
        Ok(response.tools)
    }

    /// Call a tool with the given name and arguments.
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        let name: String = name.into();
        let params = CallToolRequestParams {
            name: name.into(),
            arguments,
            meta: None,
            task: None,
        };

        self.service
            .call_tool(params)
            .await
            .map_err(|e| McpError::Request(e.to_string()))
    }

    /// Close the session and terminate the server process.
    pub async fn shutdown(self) -> Result<(), McpError> {
        self.service
            .cancel()
            .await
            .map_err(|e| McpError::Request(e.to_string()))?;
        Ok(())
    }
}
