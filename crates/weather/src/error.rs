//! Weather host error types.

use thiserror::Error;

/// Errors raised while serving a weather tool call.
///
/// None of these cross the protocol channel as faults: the host renders them
/// into error results that the model can read.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WeatherError {
    /// The requested tool is not part of the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Required arguments are missing or malformed.
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },

    /// The HTTP request to the weather provider failed.
    #[error("network error: {0}")]
    Network(String),

    /// The weather provider rejected the request (unknown place, bad key, rate limit).
    #[error("weather provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    /// The provider answered with a body we could not decode.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// Host configuration is incomplete.
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WeatherError>;
