//! # CRD Generator
//!
//! Renders the `LoggingSetup` CustomResourceDefinition as YAML from the Rust
//! type definitions, using `kube`'s `CustomResourceExt`.
//!
//! ## Usage
//!
//! ```bash
//! # Generate CRD YAML
//! cargo run --bin crdgen > config/crd/loggingsetup.yaml
//!
//! # Generate and apply directly
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use crate::crd::LoggingSetup;
use kube::core::CustomResourceExt;

const HEADER: &str = "# This file is auto-generated by crdgen
# DO NOT EDIT THIS FILE MANUALLY
# Change the types in src/crd and regenerate
#
---
";

/// The CRD as a YAML document, prefixed with a do-not-edit header
///
/// # Errors
///
/// Returns an error if the CRD cannot be serialized.
pub fn crd_yaml() -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(&LoggingSetup::crd())?;
    Ok(format!("{HEADER}{yaml}"))
}
