use crate::model::ModelError;
use crate::tools::{McpError, ToolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error("received empty response from model")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, Error>;
