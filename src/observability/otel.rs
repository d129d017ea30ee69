//! # OpenTelemetry Support
//!
//! Optional Datadog trace export through `datadog-opentelemetry`.
//!
//! Export is enabled only when `DD_API_KEY` is present. The usual `DD_*`
//! variables are honoured; missing ones get defaults before the tracer
//! provider is built:
//!
//! - `DD_SERVICE` defaults to `logging-setup-controller`
//! - `DD_VERSION` defaults to `<crate version>-<git hash>`
//! - `DD_SITE` defaults to `datadoghq.com`
//! - `DD_TRACE_AGENT_URL` defaults to `http://localhost:8126`

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_SERVICE: &str = "logging-setup-controller";
const DEFAULT_SITE: &str = "datadoghq.com";
const DEFAULT_AGENT_URL: &str = "http://localhost:8126";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracer provider handle for graceful shutdown
#[derive(Debug)]
pub struct TracerProviderHandle(opentelemetry_sdk::trace::SdkTracerProvider);

/// Whether trace export is configured in this environment
pub fn datadog_configured() -> bool {
    std::env::var("DD_API_KEY").is_ok_and(|key| !key.is_empty())
}

/// Initialize Datadog tracing if `DD_API_KEY` is set
///
/// Returns `Ok(None)` when tracing export is not configured.
///
/// # Errors
///
/// Currently infallible; kept fallible so callers treat tracer setup like
/// any other startup step.
pub fn init_otel() -> Result<Option<TracerProviderHandle>> {
    if !datadog_configured() {
        if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
            warn!("OTEL_EXPORTER_OTLP_ENDPOINT is set but only Datadog export is supported");
        }
        info!("No DD_API_KEY provided, skipping trace export");
        return Ok(None);
    }

    set_default("DD_SERVICE", DEFAULT_SERVICE);
    set_default(
        "DD_VERSION",
        &format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("BUILD_GIT_HASH")),
    );
    set_default("DD_SITE", DEFAULT_SITE);
    set_default("DD_TRACE_AGENT_URL", DEFAULT_AGENT_URL);

    info!(
        "Initializing Datadog tracing: service={}, version={}, env={:?}, agent={}",
        std::env::var("DD_SERVICE").unwrap_or_default(),
        std::env::var("DD_VERSION").unwrap_or_default(),
        std::env::var("DD_ENV").ok(),
        std::env::var("DD_TRACE_AGENT_URL").unwrap_or_default(),
    );

    let tracer_provider = datadog_opentelemetry::tracing().init();

    info!("Datadog tracing initialized");
    Ok(Some(TracerProviderHandle(tracer_provider)))
}

fn set_default(key: &str, value: &str) {
    if std::env::var(key).is_err() {
        std::env::set_var(key, value);
    }
}

/// Flush pending spans and shut the tracer provider down
pub fn shutdown_otel(tracer_provider: Option<TracerProviderHandle>) {
    let Some(TracerProviderHandle(provider)) = tracer_provider else {
        return;
    };

    info!("Shutting down Datadog tracer provider...");
    if let Err(e) = provider.shutdown_with_timeout(SHUTDOWN_TIMEOUT) {
        warn!("Error shutting down Datadog tracer provider: {}", e);
    } else {
        info!("Datadog tracer provider shut down");
    }
}
