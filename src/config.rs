//! Environment-based configuration
//!
//! All upstream coordinates live in an explicit struct handed to the fetcher
//! and resolver at construction. Nothing reads the environment after startup.

use std::env;

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Base URL of the upstream REST API, e.g. `http://127.0.0.1:3000/api`
    pub base_url: String,
    /// Shared secret forwarded on every internal service call
    pub service_token: String,
    /// Service name announced alongside the token
    pub service_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ReportConfig {
    /// Load configuration from environment variables.
    ///
    /// `REST_API_URL` defaults to the local gateway; `SERVICE_TOKEN` is
    /// required because every upstream endpoint sits behind the internal
    /// service middleware.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            env::var("REST_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000/api".to_string());

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "REST_API_URL must start with http:// or https://".to_string(),
            ));
        }

        let service_token = env::var("SERVICE_TOKEN")
            .map_err(|_| ConfigError::MissingVariable("SERVICE_TOKEN".to_string()))?;

        let service_name =
            env::var("SERVICE_NAME").unwrap_or_else(|_| "report-service".to_string());

        let timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "HTTP_TIMEOUT_SECS must be an integer, got '{}'",
                    raw
                ))
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_token,
            service_name,
            timeout_secs,
        })
    }
}
