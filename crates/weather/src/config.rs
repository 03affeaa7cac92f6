//! Host configuration from the process environment.

use crate::auth::{ApiKeys, CLIENT_KEY_VAR, SERVER_KEYS_VAR};
use crate::error::{Result, WeatherError};
use crate::provider::DEFAULT_BASE_URL;

/// Environment variable holding the OpenWeatherMap key.
pub const WEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Optional override of the provider API root.
pub const WEATHER_URL_VAR: &str = "OPENWEATHER_BASE_URL";

/// Everything the host needs at startup.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub weather_api_key: String,
    pub base_url: String,
    /// Accepted client keys. Empty disables authentication.
    pub accepted_keys: ApiKeys,
    /// Key presented by the client that spawned us.
    pub presented_key: Option<String>,
}

impl HostConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let weather_api_key = lookup(WEATHER_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| WeatherError::Config(format!("{WEATHER_KEY_VAR} not set")))?;

        Ok(Self {
            weather_api_key,
            base_url: lookup(WEATHER_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            accepted_keys: ApiKeys::parse(&lookup(SERVER_KEYS_VAR).unwrap_or_default()),
            presented_key: lookup(CLIENT_KEY_VAR).filter(|k| !k.is_empty()),
        })
    }
}
