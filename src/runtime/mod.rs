//! # Runtime
//!
//! - `initialization`: startup sequence
//! - `watch_loop`: the `kube-runtime` controller loop
//! - `error_policy`: reconcile retry backoff and watch error handling

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;
