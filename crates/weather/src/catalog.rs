//! The fixed catalog of weather tools and their arguments.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::{Result, WeatherError};

/// A tool declaration as published to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema object describing the arguments.
    pub input_schema: Map<String, Value>,
}

/// The operations this host supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherTool {
    CurrentWeather,
    Forecast,
    WeatherByCoordinates,
}

impl WeatherTool {
    /// Every tool, in publication order.
    pub const ALL: [WeatherTool; 3] = [
        Self::CurrentWeather,
        Self::Forecast,
        Self::WeatherByCoordinates,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CurrentWeather => "get_current_weather",
            Self::Forecast => "get_forecast",
            Self::WeatherByCoordinates => "get_weather_by_coordinates",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::CurrentWeather => "Get current weather conditions for a city",
            Self::Forecast => {
                "Get 5-day weather forecast for a city (data points every 3 hours)"
            }
            Self::WeatherByCoordinates => "Get current weather by geographic coordinates",
        }
    }

    pub fn input_schema(self) -> Map<String, Value> {
        let schema = match self {
            Self::CurrentWeather => json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name (e.g., 'San Francisco' or 'London,UK')"
                    }
                },
                "required": ["city"]
            }),
            Self::Forecast => json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name (e.g., 'San Francisco' or 'Tokyo,JP')"
                    }
                },
                "required": ["city"]
            }),
            Self::WeatherByCoordinates => json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "Latitude coordinate"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "Longitude coordinate"
                    }
                },
                "required": ["latitude", "longitude"]
            }),
        };

        match schema {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    pub fn declaration(self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }

    /// Validate raw call arguments into a provider query.
    pub fn parse_arguments(self, arguments: Option<&Map<String, Value>>) -> Result<WeatherQuery> {
        let value = Value::Object(arguments.cloned().unwrap_or_default());

        match self {
            Self::CurrentWeather | Self::Forecast => {
                let CityArgs { city } =
                    serde_json::from_value(value).map_err(|e| self.invalid(e))?;
                let city = city.trim();
                if city.is_empty() {
                    return Err(self.invalid("city must not be empty"));
                }
                Ok(WeatherQuery::City(city.to_string()))
            }
            Self::WeatherByCoordinates => {
                let CoordinateArgs {
                    latitude,
                    longitude,
                } = serde_json::from_value(value).map_err(|e| self.invalid(e))?;

                let latitude = latitude
                    .to_f64()
                    .filter(|v| (-90.0..=90.0).contains(v))
                    .ok_or_else(|| self.invalid("latitude must be a number in [-90, 90]"))?;
                let longitude = longitude
                    .to_f64()
                    .filter(|v| (-180.0..=180.0).contains(v))
                    .ok_or_else(|| self.invalid("longitude must be a number in [-180, 180]"))?;

                Ok(WeatherQuery::Coordinates {
                    latitude,
                    longitude,
                })
            }
        }
    }

    fn invalid(self, reason: impl fmt::Display) -> WeatherError {
        WeatherError::InvalidArguments {
            tool: self.name(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for WeatherTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeatherTool {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| WeatherError::UnknownTool(s.to_string()))
    }
}

/// Where to look up weather.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl WeatherQuery {
    /// Query-string parameters for the provider.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::City(city) => vec![("q", city.clone())],
            Self::Coordinates {
                latitude,
                longitude,
            } => vec![("lat", latitude.to_string()), ("lon", longitude.to_string())],
        }
    }
}

#[derive(Deserialize)]
struct CityArgs {
    city: String,
}

#[derive(Deserialize)]
struct CoordinateArgs {
    latitude: Coordinate,
    longitude: Coordinate,
}

/// Models sometimes send coordinates as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for tool in WeatherTool::ALL {
            assert_eq!(tool.name().parse::<WeatherTool>().unwrap(), tool);
        }
        assert!(matches!(
            "get_moon_phase".parse::<WeatherTool>(),
            Err(WeatherError::UnknownTool(name)) if name == "get_moon_phase"
        ));
    }

    #[test]
    fn schemas_declare_required_parameters() {
        let schema = WeatherTool::WeatherByCoordinates.input_schema();
        assert_eq!(schema["required"], json!(["latitude", "longitude"]));
        assert_eq!(schema["properties"]["latitude"]["type"], "number");

        let schema = WeatherTool::CurrentWeather.input_schema();
        assert_eq!(schema["required"], json!(["city"]));
    }

    #[test]
    fn city_is_trimmed() {
        let query = WeatherTool::CurrentWeather
            .parse_arguments(Some(&args(json!({"city": "  Tokyo "}))))
            .unwrap();
        assert_eq!(query, WeatherQuery::City("Tokyo".into()));
    }

    #[test]
    fn missing_city_is_rejected() {
        let err = WeatherTool::Forecast.parse_arguments(None).unwrap_err();
        assert!(err.to_string().contains("city"), "{err}");

        let err = WeatherTool::CurrentWeather
            .parse_arguments(Some(&args(json!({"city": "   "}))))
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidArguments { .. }));
    }

    #[test]
    fn coordinates_accept_numbers_and_numeric_strings() {
        let query = WeatherTool::WeatherByCoordinates
            .parse_arguments(Some(&args(json!({"latitude": 51.5074, "longitude": "-0.1278"}))))
            .unwrap();
        assert_eq!(
            query,
            WeatherQuery::Coordinates {
                latitude: 51.5074,
                longitude: -0.1278
            }
        );
    }

    #[test]
    fn coordinates_out_of_range_are_rejected() {
        let err = WeatherTool::WeatherByCoordinates
            .parse_arguments(Some(&args(json!({"latitude": 95, "longitude": 10}))))
            .unwrap_err();
        assert!(err.to_string().contains("latitude"), "{err}");

        let err = WeatherTool::WeatherByCoordinates
            .parse_arguments(Some(&args(json!({"latitude": 10}))))
            .unwrap_err();
        assert!(err.to_string().contains("longitude"), "{err}");
    }

    #[test]
    fn query_params() {
        assert_eq!(
            WeatherQuery::City("Paris".into()).params(),
            vec![("q", "Paris".to_string())]
        );
        let coords = WeatherQuery::Coordinates {
            latitude: 1.5,
            longitude: -2.0,
        };
        assert_eq!(
            coords.params(),
            vec![("lat", "1.5".to_string()), ("lon", "-2".to_string())]
        );
    }
}
