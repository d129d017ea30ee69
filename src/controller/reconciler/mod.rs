//! # Reconciler
//!
//! Core reconciliation logic for `LoggingSetup` resources.
//!
//! The reconciler:
//! - Watches `LoggingSetup` resources across all namespaces
//! - Guards each resource with a finalizer
//! - Provisions a Graylog user, index set and stream per namespace
//! - Records Graylog IDs and one condition per step in the resource status
//! - Deletes the Graylog objects before the finalizer is released
//!
//! ## Reconciliation Flow
//!
//! 1. Fetch the resource; stop if it is gone
//! 2. Deletion requested: tear down Stream, IndexSet, User; release the finalizer
//! 3. Otherwise add the finalizer if missing
//! 4. Run the provisioning steps
//! 5. Update status

pub mod reconcile;
pub mod status;
pub mod store;
pub mod types;

// Re-export public API
pub use reconcile::{reconcile, reconcile_resource};
pub use status::ConditionLedger;
pub use store::{KubeResourceStore, ResourceStore};
pub use types::{BackoffState, Reconciler, ReconcilerError, TriggerSource};
