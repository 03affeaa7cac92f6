//! Weather data sources.
//!
//! [`WeatherSource`] is the seam between tool dispatch and the outside world;
//! [`OpenWeatherMap`] is the production implementation.

use std::future::Future;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::WeatherQuery;
use crate::error::{Result, WeatherError};

/// Default OpenWeatherMap API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Something that can answer weather questions.
///
/// Each call is one outbound request; implementations must not retry.
pub trait WeatherSource: Send + Sync {
    /// Current conditions for a place or coordinate.
    fn current(&self, query: &WeatherQuery) -> impl Future<Output = Result<Conditions>> + Send;

    /// Three-hourly forecast for a place.
    fn forecast(&self, city: &str) -> impl Future<Output = Result<Forecast>> + Send;
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider data (only the fields we render; everything optional)
// ─────────────────────────────────────────────────────────────────────────────

/// Current conditions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conditions {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weather: Vec<Sky>,
    #[serde(default)]
    pub main: Measurements,
    #[serde(default)]
    pub wind: Wind,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sky {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Measurements {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Multi-day forecast.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
    #[serde(default)]
    pub city: ForecastCity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastEntry {
    /// Local timestamp, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub dt_txt: Option<String>,
    #[serde(default)]
    pub weather: Vec<Sky>,
    #[serde(default)]
    pub main: Measurements,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenWeatherMap
// ─────────────────────────────────────────────────────────────────────────────

/// OpenWeatherMap client (metric units).
#[derive(Debug, Clone)]
pub struct OpenWeatherMap {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherMap {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get<T>(&self, endpoint: &str, params: Vec<(&'static str, String)>) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut query = params;
        query.push(("appid", self.api_key.clone()));
        query.push(("units", "metric".to_string()));

        let url = Url::parse_with_params(&format!("{}/{endpoint}", self.base_url), &query)
            .map_err(|e| WeatherError::Config(format!("invalid provider URL: {e}")))?;

        debug!(endpoint, "requesting weather data");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(WeatherError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))
    }
}

impl WeatherSource for OpenWeatherMap {
    async fn current(&self, query: &WeatherQuery) -> Result<Conditions> {
        self.get("weather", query.params()).await
    }

    async fn forecast(&self, city: &str) -> Result<Forecast> {
        self.get("forecast", vec![("q", city.to_string())]).await
    }
}
