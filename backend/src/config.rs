//! Backend connection configuration.
//!
//! Native binaries read the environment (after `dotenvy` has loaded `.env`);
//! the WASM client bakes the same variable names in at build time.

use crate::error::{AppError, ErrorKind};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const URL_VAR: &str = "FOODHUB_BACKEND_URL";
const ANON_KEY_VAR: &str = "FOODHUB_BACKEND_ANON_KEY";
const SERVICE_KEY_VAR: &str = "FOODHUB_BACKEND_SERVICE_KEY";
const REQUEST_TIMEOUT_VAR: &str = "FOODHUB_REQUEST_TIMEOUT_SECS";
const CONNECT_TIMEOUT_VAR: &str = "FOODHUB_CONNECT_TIMEOUT_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL without a trailing slash, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Privileged key used by operator tooling; never shipped to the browser.
    pub service_key: Option<String>,
    pub timeouts: Timeouts,
}

impl BackendConfig {
    #[must_use]
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            url: url.trim().trim_end_matches('/').to_owned(),
            anon_key: anon_key.trim().to_owned(),
            service_key: None,
            timeouts: Timeouts::default(),
        }
    }

    #[must_use]
    pub fn with_service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(key.into());
        self
    }

    /// Build config from environment variables.
    ///
    /// Required: `FOODHUB_BACKEND_URL`, `FOODHUB_BACKEND_ANON_KEY`.
    /// Optional: `FOODHUB_BACKEND_SERVICE_KEY`, `FOODHUB_REQUEST_TIMEOUT_SECS`
    /// (default 30), `FOODHUB_CONNECT_TIMEOUT_SECS` (default 10).
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error naming the first missing or malformed variable.
    pub fn from_env() -> Result<Self, AppError> {
        let url = std::env::var(URL_VAR).ok();
        let anon_key = std::env::var(ANON_KEY_VAR).ok();
        let mut config = Self::from_parts(url.as_deref(), anon_key.as_deref())?;
        config.service_key = std::env::var(SERVICE_KEY_VAR).ok().filter(|v| !v.trim().is_empty());
        config.timeouts = Timeouts {
            request_secs: env_parse_u64(REQUEST_TIMEOUT_VAR, DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64(CONNECT_TIMEOUT_VAR, DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(config)
    }

    /// Build config from values captured when the crate was compiled.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error when the build did not set the variables.
    pub fn from_build_env() -> Result<Self, AppError> {
        Self::from_parts(option_env!("FOODHUB_BACKEND_URL"), option_env!("FOODHUB_BACKEND_ANON_KEY"))
    }

    fn from_parts(url: Option<&str>, anon_key: Option<&str>) -> Result<Self, AppError> {
        let url = url.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| missing(URL_VAR))?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::new(ErrorKind::Validation, 0, format!("{URL_VAR} must be an http(s) URL")));
        }
        let anon_key = anon_key
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing(ANON_KEY_VAR))?;
        Ok(Self::new(url, anon_key))
    }

    /// Key to send as bearer when no user session is available.
    #[must_use]
    pub fn fallback_bearer(&self) -> &str {
        self.service_key.as_deref().unwrap_or(&self.anon_key)
    }
}

fn missing(var: &str) -> AppError {
    AppError::new(ErrorKind::Validation, 0, format!("{var} is not set"))
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
