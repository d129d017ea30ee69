//! Logging Setup Controller Library
//!
//! Reconciles `LoggingSetup` resources into Graylog users, index sets and
//! streams. The binary in `main.rs` wires these modules into a
//! `kube-runtime` controller.
//!
//! ## Quick Start
//!
//! ```rust
//! use logging_setup_controller::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;

#[cfg(test)]
mod testing;
