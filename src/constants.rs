//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Identifies this controller towards Graylog.
///
/// Sent as the `X-Requested-By` header and used as the domain part of
/// generated e-mail addresses and object descriptions.
pub const OPERATOR_INFO: &str = "wd-k8s-operator";

/// Finalizer that blocks deletion of a `LoggingSetup` until Graylog objects are removed
pub const FINALIZER: &str = "logging.world-direct.at/finalizer";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default interval between successful reconciliations (seconds)
/// Every resync re-checks the Graylog objects, so drift is repaired on this schedule
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;

/// Default maximum number of reconciliations running at the same time
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;

/// Default Fibonacci backoff minimum (minutes)
pub const DEFAULT_BACKOFF_MIN_MINUTES: u64 = 1;

/// Default Fibonacci backoff maximum (minutes)
pub const DEFAULT_BACKOFF_MAX_MINUTES: u64 = 10;

/// Default delay before restarting watch stream after it ends (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Title of the index set every tenant index set is cloned from
pub const DEFAULT_INDEX_SET_TEMPLATE: &str = "wd-logging-operator-template";

/// Message field the stream rule matches against the tenant name
pub const DEFAULT_STREAM_RULE_FIELD: &str = "kubernetes_namespace_name";

/// Roles granted to generated Graylog users
pub const DEFAULT_USER_ROLES: &[&str] = &["Reader", "Dashboard Creator"];

/// Maximum number of response body characters kept in API error messages
pub const API_ERROR_BODY_SNIPPET_LEN: usize = 512;

/// Initial backoff after the API server reports 429 on the watch (milliseconds)
pub const DEFAULT_WATCH_BACKOFF_START_MS: u64 = 1_000;

/// Cap of the watch 429 backoff (milliseconds)
pub const DEFAULT_WATCH_BACKOFF_MAX_MS: u64 = 30_000;
