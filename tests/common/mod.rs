//! Shared setup for the integration tests.

use logging_setup_controller::config::GraylogConfig;
use logging_setup_controller::provider::graylog::GraylogREST;
use std::sync::Once;

static RUSTLS_INIT: Once = Once::new();

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

/// `Basic base64("admin:secret")`
pub const BASIC_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

/// Install the ring crypto provider once per test binary
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        // Err only means another test installed it first
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// A Graylog client pointed at `base_url` with the test admin credentials
pub fn graylog_client(base_url: &str) -> GraylogREST {
    init_rustls();
    let config = GraylogConfig::new(base_url, ADMIN_USER, ADMIN_PASSWORD)
        .expect("mock server URL is valid");
    GraylogREST::new(config).expect("HTTP client builds")
}
