//! # Controller
//!
//! - `backoff`: Fibonacci backoff for failed reconciliations
//! - `crdgen`: CRD YAML generation
//! - `provisioner`: Graylog user, index set and stream provisioning
//! - `reconciler`: `LoggingSetup` reconciliation
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod crdgen;
pub mod provisioner;
pub mod reconciler;
pub mod server;
