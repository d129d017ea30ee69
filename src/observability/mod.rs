//! # Observability
//!
//! - `metrics`: Prometheus metrics collection
//! - `otel`: optional Datadog trace export

pub mod metrics;
pub mod otel;
