//! Graylog API operations
//!
//! Implements [`GraylogProvider`] on top of [`GraylogREST`].

use super::{
    CreateStreamRequest, CreateStreamResponse, CreateUserRequest, GraylogError, GraylogREST,
    IndexSetList, IndexSetSummary, ShareRequest, StreamList, StreamSummary, User,
};
use crate::provider::GraylogProvider;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};

const CLUSTER_PATH: &str = "/api/cluster";
const USERS_PATH: &str = "/api/users";
const INDEX_SETS_PATH: &str = "/api/system/indices/index_sets";
const STREAMS_PATH: &str = "/api/streams";
const SHARES_PATH: &str = "/api/authz/shares/entities";

#[async_trait]
impl GraylogProvider for GraylogREST {
    async fn check_health(&self) -> Result<(), GraylogError> {
        self.call_api_expect(Method::GET, CLUSTER_PATH, None, StatusCode::OK)
            .await?;
        Ok(())
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, GraylogError> {
        let path = format!("{USERS_PATH}/{username}");
        let response = self.call_api(Method::GET, &path, None).await?;
        match response.status {
            StatusCode::OK => Ok(Some(response.json()?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(GraylogError::unexpected_status(
                Method::GET.as_str(),
                path,
                status.as_u16(),
                StatusCode::OK.as_u16(),
                &response.body,
            )),
        }
    }

    async fn create_user(&self, user: &CreateUserRequest) -> Result<(), GraylogError> {
        let body = serde_json::to_value(user)?;
        self.call_api_expect(Method::POST, USERS_PATH, Some(&body), StatusCode::CREATED)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), GraylogError> {
        let path = format!("{USERS_PATH}/{user_id}");
        self.call_api_expect(Method::DELETE, &path, None, StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }

    async fn list_index_sets(&self) -> Result<Vec<IndexSetSummary>, GraylogError> {
        let response = self
            .call_api_expect(Method::GET, INDEX_SETS_PATH, None, StatusCode::OK)
            .await?;
        let list: IndexSetList = response.json()?;
        Ok(list.index_sets)
    }

    async fn get_index_set(&self, index_set_id: &str) -> Result<Map<String, Value>, GraylogError> {
        let path = format!("{INDEX_SETS_PATH}/{index_set_id}");
        let response = self
            .call_api_expect(Method::GET, &path, None, StatusCode::OK)
            .await?;
        response.json()
    }

    async fn create_index_set(
        &self,
        index_set: &Map<String, Value>,
    ) -> Result<IndexSetSummary, GraylogError> {
        let body = Value::Object(index_set.clone());
        let response = self
            .call_api_expect(Method::POST, INDEX_SETS_PATH, Some(&body), StatusCode::OK)
            .await?;
        response.json()
    }

    async fn delete_index_set(&self, index_set_id: &str) -> Result<(), GraylogError> {
        let path = format!("{INDEX_SETS_PATH}/{index_set_id}");
        self.call_api_expect(Method::DELETE, &path, None, StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }

    async fn list_streams(&self) -> Result<Vec<StreamSummary>, GraylogError> {
        let response = self
            .call_api_expect(Method::GET, STREAMS_PATH, None, StatusCode::OK)
            .await?;
        let list: StreamList = response.json()?;
        Ok(list.streams)
    }

    async fn create_stream(&self, stream: &CreateStreamRequest) -> Result<String, GraylogError> {
        let body = serde_json::to_value(stream)?;
        let response = self
            .call_api_expect(Method::POST, STREAMS_PATH, Some(&body), StatusCode::CREATED)
            .await?;
        let created: CreateStreamResponse = response.json()?;
        Ok(created.stream_id)
    }

    async fn resume_stream(&self, stream_id: &str) -> Result<(), GraylogError> {
        let path = format!("{STREAMS_PATH}/{stream_id}/resume");
        self.call_api_expect(Method::POST, &path, None, StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }

    async fn share_entity(
        &self,
        entity_grn: &str,
        request: &ShareRequest,
    ) -> Result<(), GraylogError> {
        let path = format!("{SHARES_PATH}/{entity_grn}");
        let body = serde_json::to_value(request)?;
        self.call_api_expect(Method::POST, &path, Some(&body), StatusCode::OK)
            .await?;
        Ok(())
    }

    async fn delete_stream(&self, stream_id: &str) -> Result<(), GraylogError> {
        let path = format!("{STREAMS_PATH}/{stream_id}");
        self.call_api_expect(Method::DELETE, &path, None, StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }
}
