//! Client configuration.
//!
//! # Design
//! `ClientConfig` is assembled once, then frozen inside `ApiClient` behind an
//! `Arc`. Calls only read it, so one client can serve concurrent tasks.
//! `from_env` follows the usual "env var or default" pattern; a value that is
//! present but malformed is an error rather than silently defaulted.

use std::env;
use std::time::Duration;

use crate::account::AccountValidator;
use crate::error::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_BASE_URL: &str = "ACCOUNTS_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "ACCOUNTS_API_TIMEOUT_SECS";
pub const ENV_DEBUG: &str = "ACCOUNTS_API_DEBUG";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    max_request_timeout: Duration,
    debug: bool,
    account_validator: AccountValidator,
}

impl ClientConfig {
    /// `base_url` is scheme, host and port of the API server.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            max_request_timeout: DEFAULT_REQUEST_TIMEOUT,
            debug: false,
            account_validator: AccountValidator::new(),
        }
    }

    /// Upper bound for every request. A `CallContext` timeout can shorten it
    /// for a single call but never extend it.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.max_request_timeout = timeout;
        self
    }

    /// Emit method, URL and bodies of every exchange as DEBUG events.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "{ENV_BASE_URL} must start with http:// or https://, got {base_url}"
            )));
        }

        let mut config = Self::new(&base_url);

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}: {e}"))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        if let Some(raw) = lookup(ENV_DEBUG) {
            let enabled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "" | "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(Error::Config(format!(
                        "{ENV_DEBUG} must be a boolean, got {raw:?}"
                    )))
                }
            };
            config = config.with_debug(enabled);
        }

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_request_timeout(&self) -> Duration {
        self.max_request_timeout
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn account_validator(&self) -> &AccountValidator {
        &self.account_validator
    }
}
