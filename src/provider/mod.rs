//! # Provider Modules
//!
//! The external log-management API the controller provisions into.
//!
//! [`GraylogProvider`] is the seam between provisioning logic and HTTP:
//! `graylog::GraylogREST` talks to a real Graylog, tests use an in-memory fake.

use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod graylog;

use graylog::{
    CreateStreamRequest, CreateUserRequest, GraylogError, IndexSetSummary, ShareRequest,
    StreamSummary, User,
};

/// Graylog management operations used by provisioning and teardown
#[async_trait]
pub trait GraylogProvider: Send + Sync {
    /// Verify that Graylog is reachable and the credentials are accepted
    async fn check_health(&self) -> Result<(), GraylogError>;

    /// Look up a user by name; `None` if Graylog answers 404
    async fn get_user(&self, username: &str) -> Result<Option<User>, GraylogError>;

    async fn create_user(&self, user: &CreateUserRequest) -> Result<(), GraylogError>;

    async fn delete_user(&self, user_id: &str) -> Result<(), GraylogError>;

    async fn list_index_sets(&self) -> Result<Vec<IndexSetSummary>, GraylogError>;

    /// Fetch one index set as a raw JSON object, suitable for cloning
    async fn get_index_set(&self, index_set_id: &str) -> Result<Map<String, Value>, GraylogError>;

    /// Create an index set from a raw JSON object
    async fn create_index_set(
        &self,
        index_set: &Map<String, Value>,
    ) -> Result<IndexSetSummary, GraylogError>;

    async fn delete_index_set(&self, index_set_id: &str) -> Result<(), GraylogError>;

    async fn list_streams(&self) -> Result<Vec<StreamSummary>, GraylogError>;

    /// Create a stream and return its ID
    async fn create_stream(&self, stream: &CreateStreamRequest) -> Result<String, GraylogError>;

    /// Start routing messages into a stream
    async fn resume_stream(&self, stream_id: &str) -> Result<(), GraylogError>;

    /// Set the grantees of an entity identified by its GRN
    async fn share_entity(
        &self,
        entity_grn: &str,
        request: &ShareRequest,
    ) -> Result<(), GraylogError>;

    async fn delete_stream(&self, stream_id: &str) -> Result<(), GraylogError>;
}
