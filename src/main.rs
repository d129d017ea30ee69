//! # Logging Setup Controller
//!
//! Kubernetes controller that gives every namespace with a `LoggingSetup`
//! resource its own Graylog user, index set and stream, and removes them
//! again when the resource is deleted.
//!
//! ## Configuration
//!
//! - `GRAYLOG_URL`, `GRAYLOG_USER`, `GRAYLOG_PASSWORD` (required)
//! - `METRICS_PORT`, `MAX_CONCURRENT_RECONCILIATIONS`, `RESYNC_INTERVAL_SECS`,
//!   `BACKOFF_MIN_MINUTES`, `BACKOFF_MAX_MINUTES`, `WATCH_RESTART_DELAY_SECS`,
//!   `PROVISIONING_POLICY`, `INDEX_SET_TEMPLATE`, `STREAM_RULE_FIELD`,
//!   `GRAYLOG_USER_ROLES` (optional)
//! - `RUST_LOG` for log filtering, `DD_API_KEY` and friends for trace export

use anyhow::Result;
use logging_setup_controller::observability::otel::shutdown_otel;
use logging_setup_controller::runtime::{initialization::initialize, watch_loop::run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    let result = run_watch_loop(init.api, init.reconciler, init.server_state).await;

    shutdown_otel(init.otel_tracer_provider);
    result
}
