//! # Initialization
//!
//! Controller startup: rustls, tracing, metrics, probe server, Graylog
//! configuration and health check, Kubernetes client and reconciler.
//!
//! Missing Graylog settings and a failing Graylog health check are fatal;
//! the watch is never started in that case.

use crate::config::{ControllerConfig, GraylogConfig};
use crate::constants::{DEFAULT_SERVER_POLL_INTERVAL_MS, DEFAULT_SERVER_STARTUP_TIMEOUT_SECS};
use crate::controller::reconciler::{KubeResourceStore, Reconciler};
use crate::controller::server::{start_server, ServerState};
use crate::crd::LoggingSetup;
use crate::observability;
use crate::provider::graylog::GraylogREST;
use crate::provider::GraylogProvider;
use anyhow::{Context, Result};
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn, Instrument};

const DEFAULT_LOG_FILTER: &str = "logging_setup_controller=info";

/// Everything the watch loop needs
pub struct InitializationResult {
    /// API for `LoggingSetup` in all namespaces
    pub api: Api<LoggingSetup>,
    pub reconciler: Arc<Reconciler>,
    pub server_state: Arc<ServerState>,
    /// Datadog tracer provider (if initialized)
    pub otel_tracer_provider: Option<observability::otel::TracerProviderHandle>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.is_ready())
            .field("tracing_export", &self.otel_tracer_provider.is_some())
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// # Errors
///
/// Returns an error if configuration is missing, Graylog is unreachable, the
/// probe server cannot start or no Kubernetes client can be created.
pub async fn initialize() -> Result<InitializationResult> {
    // Err only means a provider was installed already
    let _ = rustls::crypto::ring::default_provider().install_default();

    let otel_tracer_provider =
        observability::otel::init_otel().context("Failed to initialize OpenTelemetry")?;
    init_tracing(otel_tracer_provider.is_some());

    info!("Starting Logging Setup Controller");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let config = ControllerConfig::from_env().context("Invalid controller configuration")?;
    info!("Controller configuration: {:?}", config);

    let graylog_config =
        GraylogConfig::from_env().context("Graylog connection settings are incomplete")?;

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_task_state = Arc::clone(&server_state);
    let port = config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, server_task_state).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle).await?;

    let graylog = GraylogREST::new(graylog_config).context("Failed to build Graylog client")?;
    graylog
        .check_health()
        .await
        .context("Graylog health check failed")?;
    info!("Graylog is reachable");

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let api: Api<LoggingSetup> = Api::all(client.clone());

    let reconciler = Arc::new(Reconciler::new(
        Arc::new(KubeResourceStore::new(client)),
        Arc::new(graylog),
        config,
    ));

    summarize_existing_resources(&api)
        .instrument(tracing::info_span!("controller.startup.existing_resources"))
        .await;

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        api,
        reconciler,
        server_state,
        otel_tracer_provider,
    })
}

fn init_tracing(otel_enabled: bool) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .try_init();

    // datadog-opentelemetry may have installed its own subscriber
    if let Err(e) = result {
        if otel_enabled {
            warn!("Tracing subscriber already initialized: {}", e);
        } else {
            eprintln!("Failed to initialize tracing subscriber: {e}");
        }
    }
}

/// Wait until the probe server has bound its port
async fn wait_for_server_ready(
    server_state: &ServerState,
    server_handle: &tokio::task::JoinHandle<()>,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(DEFAULT_SERVER_STARTUP_TIMEOUT_SECS);
    let poll_interval = Duration::from_millis(DEFAULT_SERVER_POLL_INTERVAL_MS);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Log the resources found at startup, grouped by namespace
///
/// The controller's initial list reconciles all of them; this only checks
/// that the CRD is installed and gives operators an overview.
async fn summarize_existing_resources(api: &Api<LoggingSetup>) {
    let list = match api.list(&ListParams::default()).await {
        Ok(list) => list,
        Err(e) => {
            error!("CRD is not queryable: {}. Is the CRD installed?", e);
            error!("Installation: cargo run --bin crdgen | kubectl apply -f -");
            warn!("Continuing, the watch will retry");
            return;
        }
    };

    if list.items.is_empty() {
        info!("No existing LoggingSetup resources found");
        return;
    }

    let mut by_namespace: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in &list.items {
        by_namespace
            .entry(item.namespace().unwrap_or_default())
            .or_default()
            .push(item.name_any());
    }

    info!(
        "Found {} LoggingSetup resources in {} namespaces",
        list.items.len(),
        by_namespace.len()
    );
    for (namespace, mut names) in by_namespace {
        names.sort();
        info!("  {}: {}", namespace, names.join(", "));
    }
}
