//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `logging_setup_reconciliations_total` - Total number of reconciliations
//! - `logging_setup_reconciliation_errors_total` - Total number of reconciliation errors
//! - `logging_setup_reconciliation_duration_seconds` - Duration of reconciliation operations
//! - `logging_setup_provisioning_steps_total` - Provisioning step outcomes by step and outcome
//! - `logging_setup_teardowns_total` - Total number of finalizer teardowns
//! - `logging_setup_teardown_errors_total` - Total number of failed teardowns
//! - `logging_setup_graylog_requests_total` - Graylog API requests by method and status
//! - `logging_setup_graylog_request_duration_seconds` - Duration of Graylog API requests
//! - `logging_setup_graylog_request_errors_total` - Graylog API requests that failed in transport
//! - `logging_setup_requeues_total` - Requeues by trigger (`resync`, `error`)
//! - `logging_setup_status_update_errors_total` - Failed status or finalizer writes

use anyhow::Result;
use prometheus::{Histogram, HistogramVec, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "logging_setup_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "logging_setup_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "logging_setup_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static PROVISIONING_STEPS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "logging_setup_provisioning_steps_total",
            "Provisioning step outcomes by step (user, index_set, stream) and outcome",
        ),
        &["step", "outcome"],
    )
    .expect("Failed to create PROVISIONING_STEPS_TOTAL metric - this should never happen")
});

static TEARDOWNS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "logging_setup_teardowns_total",
        "Total number of finalizer teardowns",
    )
    .expect("Failed to create TEARDOWNS_TOTAL metric - this should never happen")
});

static TEARDOWN_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "logging_setup_teardown_errors_total",
        "Total number of finalizer teardowns that failed",
    )
    .expect("Failed to create TEARDOWN_ERRORS_TOTAL metric - this should never happen")
});

static GRAYLOG_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "logging_setup_graylog_requests_total",
            "Total number of Graylog API requests by method and response status",
        ),
        &["method", "status"],
    )
    .expect("Failed to create GRAYLOG_REQUESTS_TOTAL metric - this should never happen")
});

static GRAYLOG_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "logging_setup_graylog_request_duration_seconds",
            "Duration of Graylog API requests in seconds by method",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method"],
    )
    .expect("Failed to create GRAYLOG_REQUEST_DURATION metric - this should never happen")
});

static GRAYLOG_REQUEST_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "logging_setup_graylog_request_errors_total",
            "Total number of Graylog API requests that failed before a response was received",
        ),
        &["method"],
    )
    .expect("Failed to create GRAYLOG_REQUEST_ERRORS_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "logging_setup_requeues_total",
            "Total number of requeues by trigger (resync, error)",
        ),
        &["trigger"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

static STATUS_UPDATE_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "logging_setup_status_update_errors_total",
        "Total number of failed status writes",
    )
    .expect("Failed to create STATUS_UPDATE_ERRORS_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(PROVISIONING_STEPS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(TEARDOWNS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(TEARDOWN_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(GRAYLOG_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(GRAYLOG_REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(GRAYLOG_REQUEST_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STATUS_UPDATE_ERRORS_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

/// Record the outcome of one provisioning step
///
/// `outcome` is one of `provisioned`, `failed`, `skipped`.
pub fn record_provisioning_step(step: &str, outcome: &str) {
    PROVISIONING_STEPS_TOTAL
        .with_label_values(&[step, outcome])
        .inc();
}

pub fn increment_teardowns() {
    TEARDOWNS_TOTAL.inc();
}

pub fn increment_teardown_errors() {
    TEARDOWN_ERRORS_TOTAL.inc();
}

/// Record a Graylog API request that received a response
pub fn record_graylog_request(method: &str, status: u16, duration: f64) {
    let status = status.to_string();
    GRAYLOG_REQUESTS_TOTAL
        .with_label_values(&[method, status.as_str()])
        .inc();
    GRAYLOG_REQUEST_DURATION
        .with_label_values(&[method])
        .observe(duration);
}

/// Record a Graylog API request that failed in transport
pub fn increment_graylog_request_errors(method: &str) {
    GRAYLOG_REQUEST_ERRORS_TOTAL
        .with_label_values(&[method])
        .inc();
}

pub fn increment_requeues(trigger: &str) {
    REQUEUES_TOTAL.with_label_values(&[trigger]).inc();
}

pub fn increment_status_update_errors() {
    STATUS_UPDATE_ERRORS_TOTAL.inc();
}
