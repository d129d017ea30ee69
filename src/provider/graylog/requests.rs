//! # Request Types
//!
//! Graylog REST API request bodies.
//!
//! Index sets are cloned from a template as raw JSON objects, so there is no
//! typed request for them here.

use serde::Serialize;
use std::collections::BTreeMap;

/// Stream rule type "match exactly"
pub const STREAM_RULE_MATCH_EXACTLY: i32 = 1;

/// Capability granted when sharing a stream with a user
pub const CAPABILITY_VIEW: &str = "view";

/// Request body for `POST /api/users`
#[derive(Clone, Serialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("password", &"***")
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Request body for `POST /api/streams`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateStreamRequest {
    pub title: String,
    pub description: String,
    pub rules: Vec<StreamRule>,
    pub remove_matches_from_default_stream: bool,
    pub index_set_id: String,
}

/// A single stream rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRule {
    pub field: String,
    pub value: String,
    #[serde(rename = "type")]
    pub rule_type: i32,
}

/// Request body for `POST /api/authz/shares/entities/{grn}`
///
/// Maps grantee GRNs to the capability they receive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShareRequest {
    pub selected_grantee_capabilities: BTreeMap<String, String>,
}

impl ShareRequest {
    /// Grant a single capability to a single grantee
    pub fn grant(grantee_grn: String, capability: &str) -> Self {
        let mut selected_grantee_capabilities = BTreeMap::new();
        selected_grantee_capabilities.insert(grantee_grn, capability.to_string());
        Self {
            selected_grantee_capabilities,
        }
    }
}

/// GRN of a stream, the target of a share
pub fn stream_grn(stream_id: &str) -> String {
    format!("grn::::stream:{stream_id}")
}

/// GRN of a user, the grantee of a share
pub fn user_grn(user_id: &str) -> String {
    format!("grn::::user:{user_id}")
}
