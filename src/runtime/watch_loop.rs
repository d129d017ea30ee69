//! # Watch Loop
//!
//! Controller watch loop that monitors `LoggingSetup` resources in all
//! namespaces and triggers reconciliation when changes are detected.

use crate::constants::{DEFAULT_WATCH_BACKOFF_MAX_MS, DEFAULT_WATCH_BACKOFF_START_MS};
use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::crd::LoggingSetup;
use crate::runtime::error_policy::{handle_reconciliation_error, handle_watch_stream_error};
use futures::StreamExt;
use kube::api::Api;
use kube_runtime::controller::{Config as ControllerRuntimeConfig, Error as ControllerError};
use kube_runtime::{watcher, Controller};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, info, warn, Instrument};

/// Run the controller until a shutdown signal arrives
///
/// The watch is restarted after its stream ends, unless shutdown was requested.
///
/// # Errors
///
/// Currently never fails; the signature leaves room for fatal watch errors.
pub async fn run_watch_loop(
    api: Api<LoggingSetup>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let backoff_ms = Arc::new(AtomicU64::new(DEFAULT_WATCH_BACKOFF_START_MS));
    let restart_delay = reconciler.config.watch_restart_delay();
    let concurrency = reconciler.config.max_concurrent_reconciliations;

    // Readiness drops and the running controller drains as soon as SIGINT/SIGTERM arrives
    let shutdown = Arc::new(Notify::new());
    let shutdown_state = Arc::clone(&server_state);
    let shutdown_notify = Arc::clone(&shutdown);
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal, initiating graceful shutdown...");
        request_shutdown(&shutdown_state, &shutdown_notify);
    });

    loop {
        if !server_state.is_ready() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        let backoff = Arc::clone(&backoff_ms);
        let watch_span = tracing::info_span!("controller.watch", operation = "watch_loop");

        async {
            info!(
                "Starting controller watch (max {} concurrent reconciliations)",
                concurrency
            );
            Controller::new(api.clone(), watcher::Config::default().any_semantic())
                .with_config(ControllerRuntimeConfig::default().concurrency(concurrency))
                .graceful_shutdown_on(shutdown_trigger(Arc::clone(&shutdown)))
                .run(
                    reconcile,
                    handle_reconciliation_error,
                    Arc::clone(&reconciler),
                )
                .filter_map(|event| {
                    let backoff = Arc::clone(&backoff);
                    async move {
                        match event {
                            Ok((object, action)) => {
                                backoff.store(DEFAULT_WATCH_BACKOFF_START_MS, Ordering::Relaxed);
                                debug!(resource = %object, action = ?action, "watch.event.reconciled");
                                None
                            }
                            // already handled by the error policy
                            Err(ControllerError::ReconcilerFailed(e, object)) => {
                                debug!(resource = %object, error = %e, "watch.event.reconciliation_failed");
                                None
                            }
                            Err(e) => {
                                let error_string = format!("{e:?}");
                                handle_watch_stream_error(
                                    &error_string,
                                    &backoff,
                                    DEFAULT_WATCH_BACKOFF_MAX_MS,
                                    restart_delay,
                                )
                                .await
                            }
                        }
                    }
                })
                .for_each(|()| futures::future::ready(()))
                .await;
        }
        .instrument(watch_span)
        .await;

        if !server_state.is_ready() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        warn!(
            "Controller watch stream ended, restarting in {} seconds...",
            restart_delay.as_secs()
        );
        tokio::time::sleep(restart_delay).await;
    }

    info!("Controller stopped gracefully");
    Ok(())
}

/// Resolves on SIGINT or, on unix, SIGTERM
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler, listening for SIGINT only");
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Failed to listen for SIGINT");
                    std::future::pending::<()>().await;
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Mark the controller not ready and release the running controller
fn request_shutdown(server_state: &ServerState, shutdown: &Notify) {
    server_state.set_ready(false);
    // notify_one keeps a permit when no controller is waiting yet
    shutdown.notify_one();
}

/// Future handed to the controller runtime as its graceful shutdown trigger
fn shutdown_trigger(shutdown: Arc<Notify>) -> impl Future<Output = ()> + Send + Sync + 'static {
    async move { shutdown.notified().await }
}
