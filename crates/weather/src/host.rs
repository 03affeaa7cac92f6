//! Tool dispatch: credential check, argument validation, fetch, format.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::auth::{ApiKeys, Decision};
use crate::catalog::{ToolDeclaration, WeatherQuery, WeatherTool};
use crate::error::{Result, WeatherError};
use crate::format;
use crate::provider::WeatherSource;

/// Text result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Serves the weather catalog against a [`WeatherSource`].
pub struct WeatherHost<S> {
    source: S,
    keys: ApiKeys,
    presented_key: Option<String>,
    tools: HashMap<&'static str, WeatherTool>,
}

impl<S: WeatherSource> WeatherHost<S> {
    /// Create a host.
    ///
    /// `presented_key` is the credential the connected client supplied at
    /// startup; it is checked against `keys` on every call.
    pub fn new(source: S, keys: ApiKeys, presented_key: Option<String>) -> Self {
        let tools = WeatherTool::ALL
            .into_iter()
            .map(|tool| (tool.name(), tool))
            .collect();

        Self {
            source,
            keys,
            presented_key,
            tools,
        }
    }

    /// Declarations of every tool, in catalog order.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        WeatherTool::ALL.into_iter().map(WeatherTool::declaration).collect()
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    /// Handle one tool call. Never fails: problems come back as error output.
    pub async fn call(&self, name: &str, arguments: Option<&Map<String, Value>>) -> ToolOutput {
        if let Decision::Deny { reason } = self.keys.check(self.presented_key.as_deref()) {
            warn!(tool = name, "rejected unauthenticated tool call");
            return ToolOutput::error(format!("Authentication Error: {reason}"));
        }

        match self.dispatch(name, arguments).await {
            Ok(text) => ToolOutput::success(text),
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                ToolOutput::error(format!("Error: {e}"))
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Option<&Map<String, Value>>) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .copied()
            .ok_or_else(|| WeatherError::UnknownTool(name.to_string()))?;
        let query = tool.parse_arguments(arguments)?;

        info!(%tool, ?query, "serving tool call");

        match (tool, &query) {
            (WeatherTool::CurrentWeather, WeatherQuery::City(city)) => {
                let data = self.source.current(&query).await?;
                Ok(format::current_report(city, &data))
            }
            (WeatherTool::Forecast, WeatherQuery::City(city)) => {
                let data = self.source.forecast(city).await?;
                Ok(format::forecast_report(city, &data))
            }
            (
                WeatherTool::WeatherByCoordinates,
                WeatherQuery::Coordinates {
                    latitude,
                    longitude,
                },
            ) => {
                let data = self.source.current(&query).await?;
                Ok(format::coordinates_report(*latitude, *longitude, &data))
            }
            (tool, query) => Err(WeatherError::InvalidArguments {
                tool: tool.name(),
                reason: format!("unsupported query {query:?}"),
            }),
        }
    }
}
