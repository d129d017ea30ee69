//! # Custom Resource Definitions
//!
//! CRD types for the Logging Setup Controller.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `LoggingSetup` specification and isolation mode
//! - `status.rs` - Status types, Graylog IDs and conditions

mod spec;
mod status;

// Re-export all public types
pub use spec::{Isolation, LoggingSetup, LoggingSetupSpec};
pub use status::{Condition, ConditionType, GraylogStatus, LoggingSetupStatus};
