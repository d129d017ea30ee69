//! # Error Policy
//!
//! Error handling and backoff logic for the controller watch loop.
//! This module handles reconciliation errors and watch stream errors.

use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError, TriggerSource};
use crate::crd::LoggingSetup;
use crate::observability;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Used when the backoff table is poisoned
const FALLBACK_BACKOFF_SECS: u64 = 60;

/// Handle reconciliation errors with Fibonacci backoff
///
/// Backoff state is tracked per resource (`namespace/name`), so one failing
/// resource does not slow down the retries of another. The state is reset by
/// the next successful reconcile of the same resource.
pub fn handle_reconciliation_error(
    obj: Arc<LoggingSetup>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();

    let error_span = tracing::error_span!(
        "controller.watch.reconciliation_error",
        resource.name = %name,
        resource.namespace = %namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}/{}: {}", namespace, name, error);
    observability::metrics::increment_reconciliation_errors();

    let resource_key = format!("{namespace}/{name}");
    let (backoff_seconds, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(resource_key).or_insert_with(|| {
                BackoffState::new(ctx.config.backoff_min_minutes, ctx.config.backoff_max_minutes)
            });
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!("Failed to lock backoff_states: {}, using default backoff", e);
            (FALLBACK_BACKOFF_SECS, 0)
        }
    };

    info!(
        "Retrying in {}s (error count: {}, trigger source: {})",
        backoff_seconds,
        error_count,
        TriggerSource::ErrorBackoff.as_str()
    );

    observability::metrics::increment_requeues(TriggerSource::ErrorBackoff.as_str());
    Action::requeue(Duration::from_secs(backoff_seconds))
}

/// Kinds of watch stream failures that are handled differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorKind {
    /// 401: RBAC revoked or token expired
    Unauthorized,
    /// 410: resource version too old, normal after restarts
    Expired,
    /// 429: API server storage re-initializing
    TooManyRequests,
    /// 404: CRD missing or object deleted
    NotFound,
    Other,
}

impl WatchErrorKind {
    /// Classify a watch error by its debug rendering
    ///
    /// 404 is checked first; a plain-text 404 body surfaces as a serde error
    /// that also mentions `WatchFailed`.
    pub fn classify(error: &str) -> Self {
        let is_not_found = error.contains("ObjectNotFound")
            || error.contains("404")
            || error.contains("not found");
        if is_not_found {
            return Self::NotFound;
        }
        if error.contains("401") || error.contains("Unauthorized") {
            return Self::Unauthorized;
        }
        if error.contains("410")
            || error.contains("too old resource version")
            || error.contains("Expired")
            || error.contains("Gone")
        {
            return Self::Expired;
        }
        if error.contains("429")
            || error.contains("storage is (re)initializing")
            || error.contains("TooManyRequests")
        {
            return Self::TooManyRequests;
        }
        Self::Other
    }
}

/// Handle watch stream errors with classification and backoff
///
/// Returns `None` to filter out the error (allow restart) or `Some(())` to continue.
pub async fn handle_watch_stream_error(
    error_string: &str,
    backoff_ms: &AtomicU64,
    max_backoff_ms: u64,
    watch_restart_delay: Duration,
) -> Option<()> {
    let kind = WatchErrorKind::classify(error_string);
    warn!(error = %error_string, kind = ?kind, "controller.watch.error");

    match kind {
        WatchErrorKind::Unauthorized => {
            error!(
                "Watch authentication failed (401 Unauthorized), RBAC may have been revoked or the token expired"
            );
            error!(
                "Check: kubectl auth can-i watch loggingsetups.logging.world-direct.at --all-namespaces --as=system:serviceaccount:<namespace>:logging-setup-controller"
            );
            warn!(
                "Waiting {}s before retrying watch...",
                watch_restart_delay.as_secs()
            );
            tokio::time::sleep(watch_restart_delay).await;
            None
        }
        WatchErrorKind::Expired => {
            warn!("Watch resource version expired (410), watch will restart");
            None
        }
        WatchErrorKind::TooManyRequests => {
            let current = backoff_ms.load(Ordering::Relaxed);
            warn!(
                "API server storage reinitializing (429), backing off for {}ms before restart...",
                current
            );
            tokio::time::sleep(Duration::from_millis(current)).await;
            backoff_ms.store(
                current.saturating_mul(2).min(max_backoff_ms),
                Ordering::Relaxed,
            );
            None
        }
        WatchErrorKind::NotFound => {
            warn!(
                "LoggingSetup or its CRD not found (404), this is normal after deletions: {}",
                error_string
            );
            Some(())
        }
        WatchErrorKind::Other => {
            error!("Controller stream error: {}", error_string);
            tokio::time::sleep(watch_restart_delay).await;
            None
        }
    }
}
