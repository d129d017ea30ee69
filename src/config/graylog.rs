//! # Graylog Connection Settings
//!
//! Base URL and admin credentials used for every Graylog API call.
//! All three values are required; the controller refuses to start without them.

use reqwest::Url;
use thiserror::Error;
use zeroize::Zeroizing;

pub const GRAYLOG_URL_ENV: &str = "GRAYLOG_URL";
pub const GRAYLOG_USER_ENV: &str = "GRAYLOG_USER";
pub const GRAYLOG_PASSWORD_ENV: &str = "GRAYLOG_PASSWORD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing {0} environment variable")]
    Missing(&'static str),
    #[error("invalid Graylog URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid {key} environment variable: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Connection settings for the Graylog REST API
#[derive(Clone)]
pub struct GraylogConfig {
    pub base_url: Url,
    pub username: String,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for GraylogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraylogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl GraylogConfig {
    /// Validate and build the settings
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is empty or the URL cannot be parsed.
    pub fn new(url: &str, username: &str, password: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing(GRAYLOG_URL_ENV));
        }
        if username.is_empty() {
            return Err(ConfigError::Missing(GRAYLOG_USER_ENV));
        }
        if password.is_empty() {
            return Err(ConfigError::Missing(GRAYLOG_PASSWORD_ENV));
        }

        let base_url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        Ok(Self {
            base_url,
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
        })
    }

    /// Load from `GRAYLOG_URL`, `GRAYLOG_USER` and `GRAYLOG_PASSWORD`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any value is missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(GRAYLOG_URL_ENV).ok_or(ConfigError::Missing(GRAYLOG_URL_ENV))?;
        let username = lookup(GRAYLOG_USER_ENV).ok_or(ConfigError::Missing(GRAYLOG_USER_ENV))?;
        let password = Zeroizing::new(
            lookup(GRAYLOG_PASSWORD_ENV).ok_or(ConfigError::Missing(GRAYLOG_PASSWORD_ENV))?,
        );
        Self::new(&url, &username, &password)
    }

    /// Join an API path (always starting with `/api`) onto the base URL
    ///
    /// A path prefix on the base URL (e.g. a reverse proxy mount point) is kept.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(values: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = values
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_all_values_present() {
        let config = GraylogConfig::from_lookup(lookup(&[
            (GRAYLOG_URL_ENV, "https://graylog.example.com/"),
            (GRAYLOG_USER_ENV, "admin"),
            (GRAYLOG_PASSWORD_ENV, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.username, "admin");
        assert_eq!(config.password.as_str(), "secret");
        assert_eq!(
            config.endpoint("/api/cluster"),
            "https://graylog.example.com/api/cluster"
        );
    }

    #[test]
    fn test_missing_url() {
        let err = GraylogConfig::from_lookup(lookup(&[
            (GRAYLOG_USER_ENV, "admin"),
            (GRAYLOG_PASSWORD_ENV, "secret"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(GRAYLOG_URL_ENV));
    }

    #[test]
    fn test_empty_password_is_missing() {
        let err = GraylogConfig::from_lookup(lookup(&[
            (GRAYLOG_URL_ENV, "https://graylog.example.com"),
            (GRAYLOG_USER_ENV, "admin"),
            (GRAYLOG_PASSWORD_ENV, ""),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(GRAYLOG_PASSWORD_ENV));
    }

    #[test]
    fn test_invalid_url() {
        let err = GraylogConfig::new("not a url", "admin", "secret").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let config = GraylogConfig::new("http://proxy.local/graylog", "admin", "secret").unwrap();
        assert_eq!(
            config.endpoint("/api/streams"),
            "http://proxy.local/graylog/api/streams"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let config = GraylogConfig::new("http://graylog:9000", "admin", "hunter2").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }
}
