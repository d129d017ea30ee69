//! # Configuration
//!
//! - `controller.rs` - controller behaviour (ports, concurrency, backoff, provisioning defaults)
//! - `graylog.rs` - Graylog base URL and admin credentials

mod controller;
mod graylog;

pub use controller::{parse_roles, ControllerConfig, ProvisioningDefaults, ProvisioningPolicy};
pub use graylog::{
    ConfigError, GraylogConfig, GRAYLOG_PASSWORD_ENV, GRAYLOG_URL_ENV, GRAYLOG_USER_ENV,
};
