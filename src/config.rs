//! Runtime configuration for the upstream connection
//!
//! Values come from command-line flags with environment fallbacks (see
//! [`crate::cli`]) and are validated once here before any client is built.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Upstream API used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://dummy.restapiexample.com/api/v1/";

/// Per-request upstream timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Upper bound accepted for the upstream timeout
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Errors raised while validating configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL does not parse
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The base URL is not http(s)
    #[error("Unsupported base URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    /// The timeout is zero or above the maximum
    #[error("Invalid timeout of {0}s, expected 1 to 300 seconds")]
    InvalidTimeout(u64),
}

/// Validated settings for talking to the upstream API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacadeConfig {
    /// Base URL every endpoint path is appended to, always ending in `/`
    pub base_url: Url,
    /// Bound applied to each upstream call
    pub timeout: Duration,
}

impl FacadeConfig {
    /// Builds a config from raw values
    ///
    /// # Returns
    /// * `Ok(FacadeConfig)` with a trailing `/` guaranteed on the base URL path
    /// * `Err(ConfigError)` if the URL or timeout is unusable
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        let mut url = Url::parse(base_url.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        if timeout_secs == 0 || timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout(timeout_secs));
        }

        Ok(Self {
            base_url: url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
