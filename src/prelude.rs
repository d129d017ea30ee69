//! # Prelude
//!
//! Re-exports commonly used types and traits.
//!
//! ```rust
//! use logging_setup_controller::prelude::*;
//! ```

pub use crate::crd::*;

pub use crate::provider::graylog::{GraylogError, GraylogREST};
pub use crate::provider::GraylogProvider;

pub use crate::controller::provisioner::{EnsureReport, ProvisionError, ProvisioningData};
pub use crate::controller::reconciler::{
    reconcile, KubeResourceStore, Reconciler, ReconcilerError, ResourceStore,
};

pub use crate::config::{ControllerConfig, GraylogConfig, ProvisioningPolicy};
