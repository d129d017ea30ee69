//! # Resource Store
//!
//! Reads and writes `LoggingSetup` objects in the Kubernetes API.
//!
//! The reconciler only needs three calls, kept behind [`ResourceStore`] so the
//! state machine can be tested without an API server.

use crate::crd::{LoggingSetup, LoggingSetupStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use serde_json::json;

/// Field manager recorded on every write
const FIELD_MANAGER: &str = "logging-setup-controller";

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch the current object; `None` if it no longer exists
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<LoggingSetup>>;

    /// Replace the finalizer list
    async fn set_finalizers(&self, namespace: &str, name: &str, finalizers: &[String])
        -> Result<()>;

    /// Write the status subresource
    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &LoggingSetupStatus,
    ) -> Result<()>;
}

/// [`ResourceStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeResourceStore {
    client: Client,
}

impl std::fmt::Debug for KubeResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeResourceStore").finish_non_exhaustive()
    }
}

impl KubeResourceStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<LoggingSetup> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<LoggingSetup>> {
        self.api(namespace)
            .get_opt(name)
            .await
            .with_context(|| format!("Failed to get LoggingSetup {namespace}/{name}"))
    }

    async fn set_finalizers(
        &self,
        namespace: &str,
        name: &str,
        finalizers: &[String],
    ) -> Result<()> {
        let patch = json!({
            "metadata": {
                "finalizers": finalizers
            }
        });
        self.api(namespace)
            .patch(
                name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(patch),
            )
            .await
            .with_context(|| format!("Failed to patch finalizers of LoggingSetup {namespace}/{name}"))?;
        Ok(())
    }

    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &LoggingSetupStatus,
    ) -> Result<()> {
        let patch = json!({
            "status": status
        });
        self.api(namespace)
            .patch_status(
                name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(patch),
            )
            .await
            .with_context(|| format!("Failed to patch status of LoggingSetup {namespace}/{name}"))?;
        Ok(())
    }
}
