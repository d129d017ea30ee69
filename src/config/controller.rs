//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use super::ConfigError;
use crate::constants::{
    DEFAULT_BACKOFF_MAX_MINUTES, DEFAULT_BACKOFF_MIN_MINUTES, DEFAULT_INDEX_SET_TEMPLATE,
    DEFAULT_MAX_CONCURRENT_RECONCILIATIONS, DEFAULT_METRICS_PORT, DEFAULT_RESYNC_INTERVAL_SECS,
    DEFAULT_STREAM_RULE_FIELD, DEFAULT_USER_ROLES, DEFAULT_WATCH_RESTART_DELAY_SECS,
};
use std::str::FromStr;
use std::time::Duration;

/// Decides whether a step that already reports success is checked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvisioningPolicy {
    /// Every reconcile looks up all three Graylog objects and recreates missing ones
    #[default]
    AlwaysRevalidate,
    /// Steps whose condition is True and whose ID is persisted are not looked up again.
    /// Objects deleted out-of-band are not detected in this mode.
    SkipProvisioned,
}

impl FromStr for ProvisioningPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always-revalidate" | "always" => Ok(Self::AlwaysRevalidate),
            "skip-provisioned" | "skip" => Ok(Self::SkipProvisioned),
            other => Err(format!("unknown provisioning policy '{other}'")),
        }
    }
}

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Port of the metrics and probe server
    pub metrics_port: u16,
    /// Maximum concurrent reconciliations
    /// Reconciles of the same resource are always serialized by the runtime
    pub max_concurrent_reconciliations: u16,
    /// Requeue interval after a successful reconciliation (seconds)
    pub resync_interval_secs: u64,
    /// Fibonacci backoff start (minutes)
    pub backoff_min_minutes: u64,
    /// Fibonacci backoff cap (minutes)
    pub backoff_max_minutes: u64,
    /// Delay before the watch stream is restarted after it ended (seconds)
    pub watch_restart_delay_secs: u64,
    /// Whether already provisioned steps are re-validated
    pub provisioning_policy: ProvisioningPolicy,
    /// Provisioning defaults applied to every `LoggingSetup`
    pub provisioning: ProvisioningDefaults,
}

/// Values every tenant shares, independent of the resource spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningDefaults {
    /// Roles granted to the generated user
    pub user_roles: Vec<String>,
    /// Title of the index set that is cloned for new tenants
    pub index_set_template: String,
    /// Message field matched by the stream rule
    pub stream_rule_field: String,
}

impl Default for ProvisioningDefaults {
    fn default() -> Self {
        Self {
            user_roles: DEFAULT_USER_ROLES.iter().map(ToString::to_string).collect(),
            index_set_template: DEFAULT_INDEX_SET_TEMPLATE.to_string(),
            stream_rule_field: DEFAULT_STREAM_RULE_FIELD.to_string(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            metrics_port: DEFAULT_METRICS_PORT,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL_SECS,
            backoff_min_minutes: DEFAULT_BACKOFF_MIN_MINUTES,
            backoff_max_minutes: DEFAULT_BACKOFF_MAX_MINUTES,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
            provisioning_policy: ProvisioningPolicy::default(),
            provisioning: ProvisioningDefaults::default(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown `PROVISIONING_POLICY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = ProvisioningDefaults::default();
        Ok(Self {
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            max_concurrent_reconciliations: env_var_or_default(
                "MAX_CONCURRENT_RECONCILIATIONS",
                DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            ),
            resync_interval_secs: env_var_or_default(
                "RESYNC_INTERVAL_SECS",
                DEFAULT_RESYNC_INTERVAL_SECS,
            ),
            backoff_min_minutes: env_var_or_default(
                "BACKOFF_MIN_MINUTES",
                DEFAULT_BACKOFF_MIN_MINUTES,
            ),
            backoff_max_minutes: env_var_or_default(
                "BACKOFF_MAX_MINUTES",
                DEFAULT_BACKOFF_MAX_MINUTES,
            ),
            watch_restart_delay_secs: env_var_or_default(
                "WATCH_RESTART_DELAY_SECS",
                DEFAULT_WATCH_RESTART_DELAY_SECS,
            ),
            provisioning_policy: parse_provisioning_policy(
                std::env::var(PROVISIONING_POLICY_ENV).ok().as_deref(),
            )?,
            provisioning: ProvisioningDefaults {
                user_roles: std::env::var("GRAYLOG_USER_ROLES")
                    .ok()
                    .map(|v| parse_roles(&v))
                    .filter(|roles| !roles.is_empty())
                    .unwrap_or(defaults.user_roles),
                index_set_template: env_var_or_default_str(
                    "INDEX_SET_TEMPLATE",
                    &defaults.index_set_template,
                ),
                stream_rule_field: env_var_or_default_str(
                    "STREAM_RULE_FIELD",
                    &defaults.stream_rule_field,
                ),
            },
        })
    }

    /// Get resync interval duration
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Get watch restart delay duration
    pub fn watch_restart_delay(&self) -> Duration {
        Duration::from_secs(self.watch_restart_delay_secs)
    }
}

/// Split a comma separated role list, dropping blanks
pub fn parse_roles(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
        .collect()
}

const PROVISIONING_POLICY_ENV: &str = "PROVISIONING_POLICY";

/// Unset or blank selects the default policy, anything unknown is rejected
fn parse_provisioning_policy(value: Option<&str>) -> Result<ProvisioningPolicy, ConfigError> {
    match value.map(str::trim) {
        None | Some("") => Ok(ProvisioningPolicy::default()),
        Some(v) => v.parse().map_err(|reason| ConfigError::InvalidValue {
            key: PROVISIONING_POLICY_ENV,
            reason,
        }),
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
