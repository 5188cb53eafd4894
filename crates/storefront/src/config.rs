//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MINI_VENDAS_API_URL` - Base URL of the backing API (default: `http://localhost:8000`)
//! - `MINI_VENDAS_CART_DIR` - Directory holding the persisted cart (default: `.mini-vendas`)
//! - `MINI_VENDAS_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_CART_DIR: &str = ".mini-vendas";
const DEFAULT_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the backing products/orders API
    pub api_url: Url,
    /// Directory used by the file-backed cart storage
    pub cart_dir: PathBuf,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("MINI_VENDAS_API_URL", DEFAULT_API_URL))?;
        let cart_dir = PathBuf::from(get_env_or_default("MINI_VENDAS_CART_DIR", DEFAULT_CART_DIR));
        let http_timeout = parse_timeout(&get_env_or_default(
            "MINI_VENDAS_HTTP_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ))?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_url,
            cart_dir,
            http_timeout,
            sentry_dsn,
        })
    }

    /// Configuration pointing at the given API, with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an http(s) URL.
    pub fn for_api(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            cart_dir: PathBuf::from(DEFAULT_CART_DIR),
            http_timeout: parse_timeout(DEFAULT_TIMEOUT_SECS)?,
            sentry_dsn: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and validate the API base URL.
fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("MINI_VENDAS_API_URL".to_string(), e.to_string())
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "MINI_VENDAS_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

/// Parse a positive timeout in whole seconds.
fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let secs = value.trim().parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("MINI_VENDAS_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
    })?;

    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "MINI_VENDAS_HTTP_TIMEOUT_SECS".to_string(),
            "must be greater than zero".to_string(),
        ));
    }

    Ok(Duration::from_secs(secs))
}
