//! Client configuration.
//!
//! The backend location is never hardcoded into the client: it comes from
//! `EXPENSE_API_URL` (or an explicit value from the host) and falls back to
//! the local development address.

use thiserror::Error;
use url::Url;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "EXPENSE_API_URL";

/// Base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API URL cannot be empty")]
    Empty,

    #[error("API URL {url:?} is invalid: {reason}")]
    Invalid { url: String, reason: String },

    #[error("API URL {0:?} must use http or https")]
    UnsupportedScheme(String),
}

/// Settings the host needs to construct an `ExpenseClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server origin, without the `/api/expenses` resource path.
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read `EXPENSE_API_URL`, defaulting to `DEFAULT_API_URL` when unset or blank.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Err(ConfigError::Empty);
        }
        let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
