//! Graylog REST Client
//!
//! Thin REST client for the Graylog management API.
//! Uses reqwest with rustls and HTTP basic authentication.
//!
//! Every request carries `Content-Type: application/json` and the
//! `X-Requested-By` header Graylog requires for state-changing calls.
//! Callers state the single status code they expect; any other status is
//! turned into [`GraylogError::UnexpectedStatus`].
//!
//! References:
//! - [Graylog REST API](https://go2docs.graylog.org/current/setting_up_graylog/rest_api.html)

mod error;
mod operations;
mod requests;
mod responses;

// Re-export types
pub use error::GraylogError;
pub use requests::*;
pub use responses::*;

use crate::config::GraylogConfig;
use crate::constants::OPERATOR_INFO;
use crate::observability::metrics;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, Instrument};

/// Graylog REST client
#[derive(Clone)]
pub struct GraylogREST {
    http_client: Client,
    config: GraylogConfig,
}

impl std::fmt::Debug for GraylogREST {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraylogREST")
            .field("base_url", &self.config.base_url.as_str())
            .field("username", &self.config.username)
            .finish_non_exhaustive()
    }
}

/// Status and raw body of a Graylog response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Decode the body as JSON
    ///
    /// # Errors
    ///
    /// Returns [`GraylogError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GraylogError> {
        serde_json::from_str(&self.body).map_err(|source| GraylogError::Decode {
            method: self.method.to_string(),
            path: self.path.clone(),
            source,
        })
    }
}

impl GraylogREST {
    /// Create a new Graylog REST client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GraylogConfig) -> Result<Self, GraylogError> {
        info!(
            "Initializing Graylog REST client for {} as {}",
            config.base_url, config.username
        );

        // rustls is selected through reqwest features
        let http_client = Client::builder()
            .user_agent(OPERATOR_INFO)
            .build()
            .map_err(GraylogError::Client)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }

    /// Build HTTP request with authentication headers
    pub(crate) fn make_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> reqwest::RequestBuilder {
        let url = self.config.endpoint(path);

        let mut request = self
            .http_client
            .request(method, url)
            .basic_auth(&self.config.username, Some(self.config.password.as_str()))
            .header("Content-Type", "application/json")
            .header("X-Requested-By", OPERATOR_INFO);

        if let Some(body) = body {
            request = request.json(body);
        }

        request
    }

    /// Send a request and return whatever Graylog answered
    ///
    /// Only transport failures are errors here; the status is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`GraylogError::Http`] if no response was received.
    pub async fn call_api(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse, GraylogError> {
        let span = tracing::debug_span!(
            "graylog.api",
            http.method = %method,
            http.path = path,
            http.status_code = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
        );
        let span_clone = span.clone();
        let method_label = method.to_string();

        async move {
            let start = Instant::now();
            let response = match self.make_request(method.clone(), path, body).send().await {
                Ok(response) => response,
                Err(source) => {
                    metrics::increment_graylog_request_errors(&method_label);
                    return Err(GraylogError::Http {
                        method: method_label,
                        path: path.to_string(),
                        source,
                    });
                }
            };

            let status = response.status();
            let body = response.text().await.map_err(|source| GraylogError::Http {
                method: method_label.clone(),
                path: path.to_string(),
                source,
            })?;

            let elapsed = start.elapsed();
            span_clone.record("http.status_code", status.as_u16());
            span_clone.record("operation.duration_ms", elapsed.as_millis() as u64);
            metrics::record_graylog_request(&method_label, status.as_u16(), elapsed.as_secs_f64());
            debug!("{} {} -> {}", method_label, path, status);

            Ok(ApiResponse {
                method,
                path: path.to_string(),
                status,
                body,
            })
        }
        .instrument(span)
        .await
    }

    /// Send a request and require a specific status code
    ///
    /// # Errors
    ///
    /// Returns [`GraylogError::UnexpectedStatus`] if Graylog answers with any
    /// other status, or [`GraylogError::Http`] on transport failure.
    pub async fn call_api_expect(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        expected: StatusCode,
    ) -> Result<ApiResponse, GraylogError> {
        let response = self.call_api(method, path, body).await?;
        if response.status != expected {
            return Err(GraylogError::unexpected_status(
                response.method.as_str(),
                response.path,
                response.status.as_u16(),
                expected.as_u16(),
                &response.body,
            ));
        }
        Ok(response)
    }
}
