use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that stop a tool call from producing any result.
///
/// A tool that runs and reports failure is not an error here; that comes back
/// as a [`ToolOutput`](super::ToolOutput) with `is_error` set.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("tool transport failed: {0}")]
    Transport(String),
}
