//! Shared-secret gating of tool calls.
//!
//! The host is configured with a set of accepted keys. An empty set disables
//! authentication entirely; otherwise the key presented by the client must be
//! an exact member of the set.

use std::collections::HashSet;

use uuid::Uuid;

/// Environment variable holding the comma-separated accepted keys.
pub const SERVER_KEYS_VAR: &str = "MCP_SERVER_API_KEYS";

/// Environment variable through which the client presents its key.
pub const CLIENT_KEY_VAR: &str = "MCP_CLIENT_API_KEY";

/// Result of a credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// The set of keys the host accepts.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    /// Build from an iterator of keys. Blank entries are ignored.
    pub fn new(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let keys = keys
            .into_iter()
            .map(Into::<String>::into)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys }
    }

    /// Parse a comma-separated list.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Whether any key is configured.
    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check a presented key against the accepted set.
    pub fn check(&self, presented: Option<&str>) -> Decision {
        if !self.is_enabled() {
            return Decision::Allow;
        }

        match presented.filter(|k| !k.is_empty()) {
            None => Decision::Deny {
                reason: format!("Missing API key. Set {CLIENT_KEY_VAR} in client environment."),
            },
            Some(key) if self.keys.contains(key) => Decision::Allow,
            Some(_) => Decision::Deny {
                reason: "Invalid API key. Access denied.".to_string(),
            },
        }
    }
}

/// Generate a fresh random API key (64 hex characters).
pub fn generate_key() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
