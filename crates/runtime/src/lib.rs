//! Weather assistant runtime: model backends, MCP tools and the agent loop.
//!
//! # Overview
//!
//! - **Backend**: a trait over LLM providers. [`ProviderBackend`] picks Gemini
//!   or Anthropic once, from [`ProviderSettings`].
//! - **ToolHost**: a trait over tool execution. [`McpToolHost`] spawns an MCP
//!   server as a child process and forwards calls to it.
//! - **Agent**: runs the bounded function-calling loop for one query at a
//!   time.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{Agent, McpToolHost, ProviderBackend, ProviderKind, ProviderSettings, ServerConfig};
//!
//! # async fn example() -> runtime::Result<()> {
//! let tools = McpToolHost::spawn(&ServerConfig::new("weather-server")).await?;
//! let backend = ProviderBackend::new(ProviderSettings {
//!     kind: ProviderKind::Gemini,
//!     api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
//!     model: None,
//!     max_tokens: 4096,
//!     system: None,
//!     base_url: None,
//! });
//!
//! let agent = Agent::new(backend, tools);
//! let reply = agent.ask("What's the weather in Oslo?").await?;
//! println!("{:?}", reply.outcome);
//! # Ok(())
//! # }
//! ```

mod agent;
mod error;
pub mod model;
pub mod providers;
pub mod tools;

pub use agent::{Agent, Conversation, DEFAULT_MAX_ROUNDS, Outcome, Reply};
pub use error::{Error, Result};

pub use model::{
    Backend, FinishReason, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall,
    ToolResult, ToolSpec, Usage,
};
pub use providers::{ProviderBackend, ProviderKind, ProviderSettings, UnknownProvider};
pub use tools::{
    CLIENT_KEY_VAR, EmptyToolHost, McpClient, McpError, McpToolHost, ServerConfig, ToolError,
    ToolHost, ToolOutput,
};
