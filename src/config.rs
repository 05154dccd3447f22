//! Client configuration for the index service endpoint.

use crate::errors::{IndexError, Result};

/// Environment variable holding the service endpoint URL.
pub const ENV_URL: &str = "VECTOR_INDEX_URL";
/// Environment variable holding the bearer token.
pub const ENV_TOKEN: &str = "VECTOR_INDEX_TOKEN";
/// Environment variable holding the optional request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "VECTOR_INDEX_TIMEOUT_SECS";

/// Connection settings for one index.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Service endpoint, e.g. `https://index.example.com`.
    pub url: String,
    /// Bearer token used for authentication.
    pub token: String,
    /// Request timeout in seconds. `None` uses the transport default.
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Creates a config with the transport's default timeout.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout_secs: None,
        }
    }

    /// Loads the config strictly from environment variables.
    ///
    /// # Errors
    /// Returns [`IndexError::Config`] if [`ENV_URL`] or [`ENV_TOKEN`] is
    /// missing/empty, or if [`ENV_TIMEOUT_SECS`] is set but not a `u64`.
    pub fn from_env() -> Result<Self> {
        let url = must_env(ENV_URL)?;
        let token = must_env(ENV_TOKEN)?;
        let timeout_secs = match std::env::var(ENV_TIMEOUT_SECS) {
            Ok(v) if !v.trim().is_empty() => Some(v.parse::<u64>().map_err(|_| {
                IndexError::Config(format!("{ENV_TIMEOUT_SECS}: expected u64, got `{v}`"))
            })?),
            _ => None,
        };

        Ok(Self {
            url,
            token,
            timeout_secs,
        })
    }

    /// Validates config values.
    ///
    /// # Errors
    /// Returns [`IndexError::Config`] on an empty/invalid URL, an empty
    /// token, or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(IndexError::Config("url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(IndexError::Config(
                "url must start with http:// or https://".into(),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(IndexError::Config("token is empty".into()));
        }
        if self.timeout_secs == Some(0) {
            return Err(IndexError::Config("timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

/// Fetches a required, non-empty environment variable.
fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(IndexError::Config(format!(
            "missing required environment variable: {name}"
        ))),
    }
}
