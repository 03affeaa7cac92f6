//! LLM provider adapters.
//!
//! Each provider implements [`Backend`] for its specific API. The concrete
//! provider is picked once, from configuration, through [`ProviderKind`];
//! everything downstream only sees [`ProviderBackend`] as a `Backend`.

mod anthropic;
mod gemini;

pub use anthropic::{AnthropicBackend, AnthropicBackendBuilder};
pub use gemini::{GeminiBackend, GeminiBackendBuilder};

use crate::model::{Backend, ModelError, ModelRequest, ModelResponse};
use std::fmt;
use std::str::FromStr;

/// Supported model providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Gemini,
    Anthropic,
}

impl ProviderKind {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => gemini::DEFAULT_MODEL,
            Self::Anthropic => anthropic::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::Anthropic => f.write_str("anthropic"),
        }
    }
}

/// Error for a provider name we do not recognise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider '{0}': must be 'gemini' or 'anthropic'")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Settings shared by both providers.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub system: Option<String>,
    pub base_url: Option<String>,
}

/// The configured backend.
pub enum ProviderBackend {
    Gemini(GeminiBackend),
    Anthropic(AnthropicBackend),
}

impl ProviderBackend {
    pub fn new(settings: ProviderSettings) -> Self {
        let model = settings
            .model
            .unwrap_or_else(|| settings.kind.default_model().to_string());

        match settings.kind {
            ProviderKind::Gemini => {
                let mut builder =
                    GeminiBackend::builder(settings.api_key, model).max_tokens(settings.max_tokens);
                if let Some(system) = settings.system {
                    builder = builder.system(system);
                }
                if let Some(url) = settings.base_url {
                    builder = builder.base_url(url);
                }
                Self::Gemini(builder.build())
            }
            ProviderKind::Anthropic => {
                let mut builder = AnthropicBackend::builder(settings.api_key, model)
                    .max_tokens(settings.max_tokens);
                if let Some(system) = settings.system {
                    builder = builder.system(system);
                }
                if let Some(url) = settings.base_url {
                    builder = builder.base_url(url);
                }
                Self::Anthropic(builder.build())
            }
        }
    }
}

impl Backend for ProviderBackend {
    fn name(&self) -> String {
        match self {
            Self::Gemini(b) => b.name(),
            Self::Anthropic(b) => b.name(),
        }
    }

    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        match self {
            Self::Gemini(b) => b.call(request).await,
            Self::Anthropic(b) => b.call(request).await,
        }
    }
}
