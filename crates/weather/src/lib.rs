//! Weather tool host.
//!
//! Publishes three weather tools over the Model Context Protocol and answers
//! calls from OpenWeatherMap data. Calls can be gated behind a shared secret
//! handed to the process through its environment.
//!
//! # Example
//!
//! ```ignore
//! use rmcp::ServiceExt;
//! use weather::{ApiKeys, OpenWeatherMap, WeatherHost, WeatherServer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let host = WeatherHost::new(OpenWeatherMap::new("owm-key"), ApiKeys::default(), None);
//! let service = WeatherServer::new(host).serve(rmcp::transport::stdio()).await?;
//! service.waiting().await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod catalog;
mod config;
mod error;
mod format;
mod host;
mod provider;
mod server;

pub use auth::{ApiKeys, Decision, generate_key};
pub use catalog::{ToolDeclaration, WeatherQuery, WeatherTool};
pub use config::HostConfig;
pub use error::{Result, WeatherError};
pub use host::{ToolOutput, WeatherHost};
pub use provider::{Conditions, Forecast, OpenWeatherMap, WeatherSource};
pub use server::WeatherServer;
