//! In-memory doubles for Graylog and the Kubernetes API, used by unit tests.
//!
//! Every Graylog call is recorded as `"METHOD path"`, matching the paths the
//! REST client sends, so tests can assert on order and count.

use crate::controller::reconciler::ResourceStore;
use crate::crd::{LoggingSetup, LoggingSetupSpec, LoggingSetupStatus};
use crate::provider::graylog::{
    CreateStreamRequest, CreateUserRequest, GraylogError, IndexSetSummary, ShareRequest,
    StreamSummary, User,
};
use crate::provider::GraylogProvider;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct GraylogState {
    users: Vec<User>,
    index_sets: Vec<(IndexSetSummary, Map<String, Value>)>,
    streams: Vec<StreamSummary>,
    calls: Vec<String>,
    failures: Vec<(String, u16, bool)>,
    created_users: Vec<CreateUserRequest>,
    created_index_sets: Vec<Map<String, Value>>,
    created_streams: Vec<CreateStreamRequest>,
    shares: Vec<(String, ShareRequest)>,
    next_id: u64,
}

impl GraylogState {
    fn next_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{kind}-{}", self.next_id)
    }
}

/// Graylog with users, index sets and streams held in memory
#[derive(Debug, Default)]
pub struct FakeGraylog {
    state: Mutex<GraylogState>,
}

impl FakeGraylog {
    /// A Graylog that already has the template index set `title`
    pub fn with_template(title: &str) -> Self {
        let graylog = Self::default();
        {
            let mut state = graylog.state.lock().unwrap();
            let id = state.next_id("template");
            let body = json!({
                "id": id,
                "title": title,
                "description": "template",
                "index_prefix": "template",
                "shards": 4,
                "replicas": 0
            });
            let Value::Object(body) = body else {
                unreachable!()
            };
            state.index_sets.push((
                IndexSetSummary {
                    id,
                    title: title.to_string(),
                },
                body,
            ));
        }
        graylog
    }

    /// Answer `status` to the call `"METHOD path"`
    pub fn fail_on(&self, call: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((call.to_string(), status, false));
    }

    /// Answer `status` to every call starting with `prefix`
    pub fn fail_on_prefix(&self, prefix: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((prefix.to_string(), status, true));
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub fn insert_user(&self, id: &str, username: &str) {
        self.state.lock().unwrap().users.push(User {
            id: id.to_string(),
            username: username.to_string(),
            ..User::default()
        });
    }

    pub fn insert_index_set(&self, id: &str, title: &str) {
        self.state.lock().unwrap().index_sets.push((
            IndexSetSummary {
                id: id.to_string(),
                title: title.to_string(),
            },
            Map::new(),
        ));
    }

    pub fn insert_stream(&self, id: &str, title: &str) {
        self.state.lock().unwrap().streams.push(StreamSummary {
            id: id.to_string(),
            title: title.to_string(),
            index_set_id: None,
        });
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Calls that create users, index sets or streams
    pub fn create_calls(&self) -> Vec<String> {
        const CREATES: [&str; 3] = [
            "POST /api/users",
            "POST /api/system/indices/index_sets",
            "POST /api/streams",
        ];
        self.calls()
            .into_iter()
            .filter(|call| CREATES.contains(&call.as_str()))
            .collect()
    }

    pub fn created_users(&self) -> Vec<CreateUserRequest> {
        self.state.lock().unwrap().created_users.clone()
    }

    pub fn created_index_sets(&self) -> Vec<Map<String, Value>> {
        self.state.lock().unwrap().created_index_sets.clone()
    }

    pub fn created_streams(&self) -> Vec<CreateStreamRequest> {
        self.state.lock().unwrap().created_streams.clone()
    }

    pub fn shares(&self) -> Vec<(String, ShareRequest)> {
        self.state.lock().unwrap().shares.clone()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn stream_count(&self) -> usize {
        self.state.lock().unwrap().streams.len()
    }

    /// Index sets other than templates
    pub fn index_set_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .index_sets
            .iter()
            .filter(|(summary, _)| !summary.id.starts_with("template"))
            .count()
    }

    /// Record the call and return the injected failure, if any
    fn call(
        &self,
        state: &mut GraylogState,
        method: &str,
        path: &str,
        expected: u16,
    ) -> Result<(), GraylogError> {
        let call = format!("{method} {path}");
        state.calls.push(call.clone());
        let failure = state.failures.iter().find(|(key, _, prefix)| {
            if *prefix {
                call.starts_with(key.as_str())
            } else {
                *key == call
            }
        });
        match failure {
            Some((_, status, _)) => Err(GraylogError::unexpected_status(
                method,
                path,
                *status,
                expected,
                "injected failure",
            )),
            None => Ok(()),
        }
    }

    fn not_found(method: &str, path: &str, expected: u16) -> GraylogError {
        GraylogError::unexpected_status(method, path, 404, expected, "not found")
    }
}

#[async_trait]
impl GraylogProvider for FakeGraylog {
    async fn check_health(&self) -> Result<(), GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, "GET", "/api/cluster", 200)
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, "GET", &format!("/api/users/{username}"), 200)?;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: &CreateUserRequest) -> Result<(), GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, "POST", "/api/users", 201)?;
        let id = state.next_id("user");
        state.users.push(User {
            id,
            username: user.username.clone(),
            full_name: Some(user.full_name.clone()),
            email: Some(user.email.clone()),
        });
        state.created_users.push(user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), GraylogError> {
        let mut state = self.state.lock().unwrap();
        let path = format!("/api/users/{user_id}");
        self.call(&mut state, "DELETE", &path, 204)?;
        let before = state.users.len();
        state.users.retain(|u| u.id != user_id);
        if state.users.len() == before {
            return Err(Self::not_found("DELETE", &path, 204));
        }
        Ok(())
    }

    async fn list_index_sets(&self) -> Result<Vec<IndexSetSummary>, GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, "GET", "/api/system/indices/index_sets", 200)?;
        Ok(state.index_sets.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn get_index_set(&self, index_set_id: &str) -> Result<Map<String, Value>, GraylogError> {
        let mut state = self.state.lock().unwrap();
        let path = format!("/api/system/indices/index_sets/{index_set_id}");
        self.call(&mut state, "GET", &path, 200)?;
        state
            .index_sets
            .iter()
            .find(|(s, _)| s.id == index_set_id)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| Self::not_found("GET", &path, 200))
    }

    async fn create_index_set(
        &self,
        index_set: &Map<String, Value>,
    ) -> Result<IndexSetSummary, GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, "POST", "/api/system/indices/index_sets", 200)?;
        let summary = IndexSetSummary {
            id: state.next_id("index-set"),
            title: index_set
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };
        state.index_sets.push((summary.clone(), index_set.clone()));
        state.created_index_sets.push(index_set.clone());
        Ok(summary)
    }

    async fn delete_index_set(&self, index_set_id: &str) -> Result<(), GraylogError> {
        let mut state = self.state.lock().unwrap();
        let path = format!("/api/system/indices/index_sets/{index_set_id}");
        self.call(&mut state, "DELETE", &path, 204)?;
        let before = state.index_sets.len();
        state.index_sets.retain(|(s, _)| s.id != index_set_id);
        if state.index_sets.len() == before {
            return Err(Self::not_found("DELETE", &path, 204));
        }
        Ok(())
    }

    async fn list_streams(&self) -> Result<Vec<StreamSummary>, GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, "GET", "/api/streams", 200)?;
        Ok(state.streams.clone())
    }

    async fn create_stream(&self, stream: &CreateStreamRequest) -> Result<String, GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, "POST", "/api/streams", 201)?;
        let id = state.next_id("stream");
        state.streams.push(StreamSummary {
            id: id.clone(),
            title: stream.title.clone(),
            index_set_id: Some(stream.index_set_id.clone()),
        });
        state.created_streams.push(stream.clone());
        Ok(id)
    }

    async fn resume_stream(&self, stream_id: &str) -> Result<(), GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(
            &mut state,
            "POST",
            &format!("/api/streams/{stream_id}/resume"),
            204,
        )
    }

    async fn share_entity(
        &self,
        entity_grn: &str,
        request: &ShareRequest,
    ) -> Result<(), GraylogError> {
        let mut state = self.state.lock().unwrap();
        self.call(
            &mut state,
            "POST",
            &format!("/api/authz/shares/entities/{entity_grn}"),
            200,
        )?;
        state
            .shares
            .push((entity_grn.to_string(), request.clone()));
        Ok(())
    }

    async fn delete_stream(&self, stream_id: &str) -> Result<(), GraylogError> {
        let mut state = self.state.lock().unwrap();
        let path = format!("/api/streams/{stream_id}");
        self.call(&mut state, "DELETE", &path, 204)?;
        let before = state.streams.len();
        state.streams.retain(|s| s.id != stream_id);
        if state.streams.len() == before {
            return Err(Self::not_found("DELETE", &path, 204));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    objects: HashMap<(String, String), LoggingSetup>,
    status_writes: usize,
    finalizer_writes: usize,
    fail_get: bool,
    fail_finalizers: bool,
    fail_status: bool,
}

/// Kubernetes API holding `LoggingSetup` objects in memory
#[derive(Debug, Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn insert(&self, object: LoggingSetup) {
        let key = (
            object.metadata.namespace.clone().unwrap_or_default(),
            object.metadata.name.clone().unwrap_or_default(),
        );
        self.state.lock().unwrap().objects.insert(key, object);
    }

    pub fn object(&self, namespace: &str, name: &str) -> Option<LoggingSetup> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn status(&self, namespace: &str, name: &str) -> LoggingSetupStatus {
        self.object(namespace, name)
            .and_then(|o| o.status)
            .unwrap_or_default()
    }

    pub fn status_writes(&self) -> usize {
        self.state.lock().unwrap().status_writes
    }

    pub fn finalizer_writes(&self) -> usize {
        self.state.lock().unwrap().finalizer_writes
    }

    pub fn fail_get(&self, fail: bool) {
        self.state.lock().unwrap().fail_get = fail;
    }

    pub fn fail_finalizers(&self, fail: bool) {
        self.state.lock().unwrap().fail_finalizers = fail;
    }

    pub fn fail_status(&self, fail: bool) {
        self.state.lock().unwrap().fail_status = fail;
    }

    /// Mark the object for deletion, as the API server does while finalizers remain
    pub fn request_deletion(&self, namespace: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(object) = state
            .objects
            .get_mut(&(namespace.to_string(), name.to_string()))
        {
            object.metadata.deletion_timestamp =
                Some(serde_json::from_value(json!("2026-01-01T00:00:00Z")).unwrap());
        }
    }
}

#[async_trait]
impl ResourceStore for FakeStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<LoggingSetup>> {
        let state = self.state.lock().unwrap();
        if state.fail_get {
            return Err(anyhow!("injected get failure"));
        }
        Ok(state
            .objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn set_finalizers(
        &self,
        namespace: &str,
        name: &str,
        finalizers: &[String],
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_finalizers {
            return Err(anyhow!("injected finalizer failure"));
        }
        state.finalizer_writes += 1;
        let key = (namespace.to_string(), name.to_string());
        let Some(object) = state.objects.get_mut(&key) else {
            return Err(anyhow!("LoggingSetup {namespace}/{name} not found"));
        };
        object.metadata.finalizers = Some(finalizers.to_vec());
        // the API server removes an object once deletion was requested and no finalizers remain
        if finalizers.is_empty() && object.metadata.deletion_timestamp.is_some() {
            state.objects.remove(&key);
        }
        Ok(())
    }

    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &LoggingSetupStatus,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_status {
            return Err(anyhow!("injected status failure"));
        }
        state.status_writes += 1;
        let Some(object) = state
            .objects
            .get_mut(&(namespace.to_string(), name.to_string()))
        else {
            return Err(anyhow!("LoggingSetup {namespace}/{name} not found"));
        };
        object.status = Some(status.clone());
        Ok(())
    }
}

/// A `LoggingSetup` named `name` in `namespace` with generation 1
pub fn logging_setup(namespace: &str, name: &str) -> LoggingSetup {
    let mut object = LoggingSetup::new(
        name,
        LoggingSetupSpec {
            initial_user_password: "initial".to_string(),
            ..LoggingSetupSpec::default()
        },
    );
    object.metadata.namespace = Some(namespace.to_string());
    object.metadata.generation = Some(1);
    object
}
