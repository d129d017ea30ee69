//! # Reconciliation Logic
//!
//! State machine for a single `LoggingSetup`:
//!
//! - **Absent**: the object is gone, nothing to do
//! - **Terminating**: deletion requested; tear down Graylog objects, then release the finalizer
//! - **Active**: make sure the finalizer is set, provision, record the outcome in status

use crate::constants::FINALIZER;
use crate::controller::provisioner::{ensure, teardown, ProvisioningData};
use crate::controller::reconciler::status::{apply_report, status_changed, steps_to_skip};
use crate::controller::reconciler::types::{Reconciler, ReconcilerError, TriggerSource};
use crate::crd::{LoggingSetup, LoggingSetupStatus};
use crate::observability;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn, Instrument};

/// Main reconciliation function
///
/// Errors are handed to the error policy, which owns the retry backoff.
pub async fn reconcile(
    resource: Arc<LoggingSetup>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let name = resource.name_any();
    let namespace = resource.namespace().unwrap_or_default();

    let span = tracing::info_span!(
        "reconcile",
        resource.name = %name,
        resource.namespace = %namespace,
        resource.kind = "LoggingSetup",
    );

    async move {
        let start = Instant::now();
        observability::metrics::increment_reconciliations();

        let result = reconcile_resource(&ctx, &namespace, &name).await;

        observability::metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
        if result.is_ok() {
            ctx.forget_backoff(&format!("{namespace}/{name}"));
        }
        result
    }
    .instrument(span)
    .await
}

/// Reconcile the object stored under `namespace/name`
///
/// # Errors
///
/// Returns the first provisioning error, the teardown error, or a failure to
/// read the object or write its finalizers.
pub async fn reconcile_resource(
    ctx: &Reconciler,
    namespace: &str,
    name: &str,
) -> Result<Action, ReconcilerError> {
    let resource = ctx
        .store
        .get(namespace, name)
        .await
        .map_err(ReconcilerError::ResourceStore)?;

    let Some(resource) = resource else {
        info!("LoggingSetup {}/{} not found, nothing to do", namespace, name);
        return Ok(Action::await_change());
    };

    if resource.is_terminating() {
        finalize(ctx, &resource, namespace, name).await
    } else {
        provision(ctx, &resource, namespace, name).await
    }
}

async fn finalize(
    ctx: &Reconciler,
    resource: &LoggingSetup,
    namespace: &str,
    name: &str,
) -> Result<Action, ReconcilerError> {
    if !resource.has_finalizer(FINALIZER) {
        debug!("Deletion requested and finalizer already released");
        return Ok(Action::await_change());
    }

    info!("Deletion requested, removing Graylog objects");
    observability::metrics::increment_teardowns();

    let old_status = resource.status.clone();
    let mut status = old_status.clone().unwrap_or_default();
    let mut ids = status.graylog.clone();

    if let Err(e) = teardown(ctx.provider.as_ref(), &mut ids).await {
        observability::metrics::increment_teardown_errors();
        error!("Teardown failed, keeping finalizer: {}", e);
        // objects deleted before the failure must not be deleted again on retry
        if ids != status.graylog {
            status.graylog = ids;
            persist_status(ctx, namespace, name, old_status.as_ref(), &status).await;
        }
        return Err(ReconcilerError::Teardown(e));
    }

    let finalizers: Vec<String> = resource
        .finalizers()
        .iter()
        .filter(|f| f.as_str() != FINALIZER)
        .cloned()
        .collect();
    ctx.store
        .set_finalizers(namespace, name, &finalizers)
        .await
        .map_err(ReconcilerError::ResourceStore)?;

    info!("Graylog objects removed, finalizer released");
    Ok(Action::await_change())
}

async fn provision(
    ctx: &Reconciler,
    resource: &LoggingSetup,
    namespace: &str,
    name: &str,
) -> Result<Action, ReconcilerError> {
    if !resource.has_finalizer(FINALIZER) {
        let mut finalizers = resource.finalizers().to_vec();
        finalizers.push(FINALIZER.to_string());
        ctx.store
            .set_finalizers(namespace, name, &finalizers)
            .await
            .map_err(ReconcilerError::ResourceStore)?;
        info!("Added finalizer {}", FINALIZER);
    }

    let provisioning_name = resource
        .provisioning_name()
        .ok_or_else(|| ReconcilerError::MissingNamespace(name.to_string()))?;

    let old_status = resource.status.clone();
    let mut status = old_status.clone().unwrap_or_default();

    let data = ProvisioningData::new(
        provisioning_name,
        &resource.spec.initial_user_password,
        &ctx.config.provisioning,
        &status.graylog,
    );
    let skip = steps_to_skip(&status, ctx.config.provisioning_policy);

    info!("Provisioning Graylog objects for {}", provisioning_name);
    let report = ensure(ctx.provider.as_ref(), data, &skip).await;

    let now = chrono::Utc::now().to_rfc3339();
    apply_report(&mut status, &report, &now);
    status.observed_generation = resource.metadata.generation;
    status.last_reconcile_time = Some(now);

    persist_status(ctx, namespace, name, old_status.as_ref(), &status).await;

    if let Some(e) = report.into_first_error() {
        return Err(ReconcilerError::Provisioning(e));
    }

    let resync = ctx.config.resync_interval();
    info!(
        "Graylog objects in place, next check in {}s (trigger source: {})",
        resync.as_secs(),
        TriggerSource::Resync.as_str()
    );
    observability::metrics::increment_requeues(TriggerSource::Resync.as_str());
    Ok(Action::requeue(resync))
}

/// Write the status when it changed; failures are logged, never returned
async fn persist_status(
    ctx: &Reconciler,
    namespace: &str,
    name: &str,
    old: Option<&LoggingSetupStatus>,
    status: &LoggingSetupStatus,
) {
    if !status_changed(old, status) {
        debug!("Skipping status update - status unchanged");
        return;
    }

    if let Err(e) = ctx.store.patch_status(namespace, name, status).await {
        observability::metrics::increment_status_update_errors();
        warn!("Failed to update status of {}/{}: {:#}", namespace, name, e);
    }
}
