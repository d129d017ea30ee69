//! # LoggingSetup Spec
//!
//! Main CRD specification.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::status::LoggingSetupStatus;

/// LoggingSetup Custom Resource Definition
///
/// Requests a Graylog user, index set and stream for the namespace the
/// resource lives in.
///
/// # Example
///
/// ```yaml
/// apiVersion: logging.world-direct.at/v1alpha1
/// kind: LoggingSetup
/// metadata:
///   name: logging
///   namespace: acme
/// spec:
///   isolation: Namespace
///   initialUserPassword: change-me-please
/// ```
#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "LoggingSetup",
    group = "logging.world-direct.at",
    version = "v1alpha1",
    namespaced,
    status = "LoggingSetupStatus",
    shortname = "ls",
    printcolumn = r#"{"name":"User", "type":"string", "jsonPath":".status.userName"}, {"name":"Stream", "type":"string", "jsonPath":".status.conditions[?(@.type==\"StreamProvisioned\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSetupSpec {
    /// How the LoggingSetup is isolated from others.
    /// Currently only 'Namespace' is supported
    #[serde(default)]
    pub isolation: Isolation,
    /// Password used when the Graylog user is created.
    /// It is only read at creation time; change it afterwards in Graylog
    #[serde(default)]
    pub initial_user_password: String,
}

/// Isolation mode of a LoggingSetup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum Isolation {
    /// One Graylog user, index set and stream per namespace, all named after it
    #[default]
    Namespace,
}

impl LoggingSetup {
    /// Name shared by the user, index set and stream in Graylog
    ///
    /// Two resources in the same namespace derive the same name and therefore
    /// manage the same Graylog objects.
    pub fn provisioning_name(&self) -> Option<&str> {
        match self.spec.isolation {
            Isolation::Namespace => self.metadata.namespace.as_deref(),
        }
    }

    /// Whether the controller finalizer is present
    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.metadata
            .finalizers
            .as_ref()
            .is_some_and(|f| f.iter().any(|x| x == finalizer))
    }

    /// Whether deletion was requested
    pub fn is_terminating(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }
}
