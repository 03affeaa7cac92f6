//! Configuration loading from weather.toml and the environment.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, environment
//! variables, command-line flags.

use runtime::{
    CLIENT_KEY_VAR, DEFAULT_MAX_ROUNDS, ProviderKind, ProviderSettings, ServerConfig,
    UnknownProvider,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "weather.toml";

pub const PROVIDER_VAR: &str = "AI_PROVIDER";
pub const MODEL_VAR: &str = "WEATHER_MODEL";

const SERVER_BIN: &str = "weather-server";

const SYSTEM_PROMPT: &str = "You are a weather assistant. Use the available tools to look up \
                             weather data and answer concisely.";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub server: ServerSection,
}

/// Model provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// "gemini" (default) or "anthropic".
    pub provider: Option<String>,
    /// Model name; each provider has its own default.
    pub name: Option<String>,
    pub max_tokens: u32,
    /// Model requests allowed per query.
    pub max_rounds: usize,
    pub system: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: None,
            name: None,
            max_tokens: 4096,
            max_rounds: DEFAULT_MAX_ROUNDS,
            system: Some(SYSTEM_PROMPT.to_string()),
        }
    }
}

/// How to launch the weather tool server.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Defaults to the `weather-server` binary next to this one.
    pub command: Option<String>,
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load an explicitly named file, or `weather.toml` if present, or defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Override file values with environment variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = non_blank(lookup(PROVIDER_VAR)) {
            self.model.provider = Some(provider);
        }
        if let Some(model) = non_blank(lookup(MODEL_VAR)) {
            self.model.name = Some(model);
        }
    }

    pub fn provider_kind(&self) -> Result<ProviderKind, ConfigError> {
        match self.model.provider.as_deref() {
            Some(name) => Ok(name.parse::<ProviderKind>()?),
            None => Ok(ProviderKind::default()),
        }
    }

    /// Settings for the selected provider, with its API key from `lookup`.
    pub fn provider_settings(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ProviderSettings, ConfigError> {
        let kind = self.provider_kind()?;
        let var = kind.api_key_var();
        let api_key = non_blank(lookup(var)).ok_or(ConfigError::MissingApiKey { var })?;

        Ok(ProviderSettings {
            kind,
            api_key,
            model: self.model.name.clone(),
            max_tokens: self.model.max_tokens,
            system: self.model.system.clone(),
            base_url: None,
        })
    }

    /// Launch settings for the tool server, carrying the client key if set.
    pub fn server_config(&self, lookup: impl Fn(&str) -> Option<String>) -> ServerConfig {
        let command = self
            .server
            .command
            .clone()
            .unwrap_or_else(default_server_command);

        ServerConfig::new(command)
            .args(self.server.args.iter().cloned())
            .api_key(non_blank(lookup(CLIENT_KEY_VAR)))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_server_command() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SERVER_BIN)))
        .filter(|path: &PathBuf| path.exists())
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| SERVER_BIN.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error(transparent)]
    UnknownProvider(#[from] UnknownProvider),

    #[error("{var} is not set")]
    MissingApiKey { var: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.model.max_rounds, 10);
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.provider_kind().unwrap(), ProviderKind::Gemini);
        assert!(config.server.args.is_empty());
    }

    #[test]
    fn parses_file_sections() {
        let config = Config::parse(
            r#"
            [model]
            provider = "anthropic"
            name = "claude-3-5-haiku-latest"
            max_rounds = 4

            [server]
            command = "/opt/bin/weather-server"
            args = ["serve"]
            "#,
        )
        .unwrap();

        assert_eq!(config.provider_kind().unwrap(), ProviderKind::Anthropic);
        assert_eq!(config.model.max_rounds, 4);
        assert_eq!(config.model.max_tokens, 4096);

        let server = config.server_config(env(&[]));
        assert_eq!(server.command, "/opt/bin/weather-server");
        assert_eq!(server.args, vec!["serve".to_string()]);
        assert_eq!(server.api_key, None);
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config::parse("[model]\nprovider = \"anthropic\"\n").unwrap();
        config.apply_env(env(&[("AI_PROVIDER", "Gemini"), ("WEATHER_MODEL", "gemini-2.0-flash")]));

        let settings = config
            .provider_settings(env(&[("GEMINI_API_KEY", "g-key")]))
            .unwrap();
        assert_eq!(settings.kind, ProviderKind::Gemini);
        assert_eq!(settings.api_key, "g-key");
        assert_eq!(settings.model.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let mut config = Config::parse("[model]\nprovider = \"anthropic\"\n").unwrap();
        config.apply_env(env(&[("AI_PROVIDER", "  ")]));
        assert_eq!(config.provider_kind().unwrap(), ProviderKind::Anthropic);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = Config::default();
        config.apply_env(env(&[("AI_PROVIDER", "openai")]));
        assert!(matches!(
            config.provider_kind(),
            Err(ConfigError::UnknownProvider(_))
        ));
    }

    #[test]
    fn missing_provider_key_names_the_variable() {
        let config = Config::parse("[model]\nprovider = \"anthropic\"\n").unwrap();
        let err = config.provider_settings(env(&[("GEMINI_API_KEY", "g")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingApiKey {
                var: "ANTHROPIC_API_KEY"
            }
        ));
        assert_eq!(err.to_string(), "ANTHROPIC_API_KEY is not set");
    }

    #[test]
    fn client_key_is_forwarded_to_server() {
        let server = Config::default().server_config(env(&[("MCP_CLIENT_API_KEY", "abc123")]));
        assert_eq!(server.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = Config::discover(Some(Path::new("/nonexistent/weather.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
