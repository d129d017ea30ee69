//! # Graylog API Errors

use crate::constants::API_ERROR_BODY_SNIPPET_LEN;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraylogError {
    #[error("failed to build Graylog HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{method} {path} failed: {source}")]
    Http {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {path} status {status}, {expected} expected: {body}")]
    UnexpectedStatus {
        method: String,
        path: String,
        status: u16,
        expected: u16,
        body: String,
    },
    #[error("failed to decode {method} {path} response: {source}")]
    Decode {
        method: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GraylogError {
    /// Build an [`GraylogError::UnexpectedStatus`], truncating the body
    pub fn unexpected_status(
        method: impl Into<String>,
        path: impl Into<String>,
        status: u16,
        expected: u16,
        body: &str,
    ) -> Self {
        GraylogError::UnexpectedStatus {
            method: method.into(),
            path: path.into(),
            status,
            expected,
            body: snippet(body),
        }
    }

    /// Status code returned by Graylog, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            GraylogError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(API_ERROR_BODY_SNIPPET_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
