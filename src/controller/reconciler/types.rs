//! # Types
//!
//! Core types for the reconciler.

use super::store::ResourceStore;
use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::provisioner::ProvisionError;
use crate::provider::GraylogProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Provisioning failed: {0}")]
    Provisioning(#[source] ProvisionError),
    #[error("Teardown failed: {0}")]
    Teardown(#[source] ProvisionError),
    #[error("Resource store error: {0:#}")]
    ResourceStore(anyhow::Error),
    #[error("LoggingSetup {0} has no namespace")]
    MissingNamespace(String),
}

/// Why a reconciliation was requeued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// Periodic drift check after a successful reconcile
    Resync,
    /// Fibonacci backoff retry after a failed reconcile
    ErrorBackoff,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerSource::Resync => "resync",
            TriggerSource::ErrorBackoff => "error-backoff",
        }
    }
}

/// Backoff state for a specific resource
/// Tracks error count and backoff calculator for progressive retries
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_minutes, max_minutes),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count += 1;
    }
}

/// Shared context of every reconcile
#[derive(Clone)]
pub struct Reconciler {
    pub store: Arc<dyn ResourceStore>,
    pub provider: Arc<dyn GraylogProvider>,
    pub config: ControllerConfig,
    // Backoff state per resource (identified by namespace/name), owned by the error policy
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        provider: Arc<dyn GraylogProvider>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Drop the backoff of a resource once it reconciled successfully or is gone
    pub fn forget_backoff(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(resource_key);
        }
    }
}
