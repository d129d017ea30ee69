//! # Response Types
//!
//! Graylog REST API response bodies. Only the fields the controller reads are
//! modelled; everything else in the payload is ignored.

use serde::Deserialize;

/// `GET /api/users/{username}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `GET /api/system/indices/index_sets`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSetList {
    #[serde(default)]
    pub index_sets: Vec<IndexSetSummary>,
    #[serde(default)]
    pub total: u64,
}

/// Identity of an index set, also returned by `POST /api/system/indices/index_sets`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IndexSetSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// `GET /api/streams`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamList {
    #[serde(default)]
    pub streams: Vec<StreamSummary>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index_set_id: Option<String>,
}

/// `POST /api/streams`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStreamResponse {
    pub stream_id: String,
}
