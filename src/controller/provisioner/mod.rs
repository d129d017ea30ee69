//! # Provisioner
//!
//! Idempotent provisioning of the Graylog objects owned by one `LoggingSetup`.
//!
//! ## Ensure
//!
//! Runs the three steps in dependency order, once, without retries:
//!
//! 1. User: find by name, else create and look it up again for its ID
//! 2. Index set: find by title, else clone the template index set
//! 3. Stream: find by title, else create, resume and share it with the user
//!
//! A failing step does not stop the later ones. Each step's outcome is
//! reported separately so the caller can record one condition per step.
//!
//! ## Teardown
//!
//! Deletes Stream, IndexSet and User in that order and stops at the first
//! failure. IDs are cleared as their objects are deleted.

mod index_set;
mod stream;
mod user;

use crate::config::ProvisioningDefaults;
use crate::crd::{ConditionType, GraylogStatus};
use crate::observability::metrics;
use crate::provider::graylog::GraylogError;
use crate::provider::GraylogProvider;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroizing;

pub use index_set::clone_template;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Graylog(#[from] GraylogError),
    #[error("template index set '{template}' not found")]
    TemplateNotFound { template: String },
    #[error("user '{username}' still not found after it was created")]
    UserMissingAfterCreate { username: String },
}

/// Everything needed to provision one tenant, rebuilt on every reconcile
#[derive(Debug, Clone)]
pub struct ProvisioningData {
    /// Username, index set title and stream title
    pub name: String,
    pub user: UserData,
    pub index_set: IndexSetData,
    pub stream: StreamData,
}

#[derive(Clone)]
pub struct UserData {
    pub initial_password: Zeroizing<String>,
    pub roles: Vec<String>,
    pub id: String,
}

impl std::fmt::Debug for UserData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserData")
            .field("initial_password", &"***")
            .field("roles", &self.roles)
            .field("id", &self.id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct IndexSetData {
    pub template_name: String,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct StreamData {
    pub rule_field_name: String,
    pub id: String,
}

impl ProvisioningData {
    /// Seed from configuration defaults and the IDs persisted in status
    pub fn new(
        name: &str,
        initial_password: &str,
        defaults: &ProvisioningDefaults,
        persisted: &GraylogStatus,
    ) -> Self {
        Self {
            name: name.to_string(),
            user: UserData {
                initial_password: Zeroizing::new(initial_password.to_string()),
                roles: defaults.user_roles.clone(),
                id: persisted.user_id.clone(),
            },
            index_set: IndexSetData {
                template_name: defaults.index_set_template.clone(),
                id: persisted.index_set_id.clone(),
            },
            stream: StreamData {
                rule_field_name: defaults.stream_rule_field.clone(),
                id: persisted.stream_id.clone(),
            },
        }
    }

    /// The external IDs currently known
    #[must_use]
    pub fn ids(&self) -> GraylogStatus {
        GraylogStatus {
            user_id: self.user.id.clone(),
            index_set_id: self.index_set.id.clone(),
            stream_id: self.stream.id.clone(),
        }
    }
}

/// Result of one ensure step
#[derive(Debug)]
pub enum StepOutcome {
    /// The object exists; its ID is in the returned `ProvisioningData`
    Provisioned,
    Failed(ProvisionError),
    /// Not attempted because it was already provisioned
    Skipped,
}

impl StepOutcome {
    fn label(&self) -> &'static str {
        match self {
            StepOutcome::Provisioned => "provisioned",
            StepOutcome::Failed(_) => "failed",
            StepOutcome::Skipped => "skipped",
        }
    }

    fn from_result(result: Result<(), ProvisionError>) -> Self {
        match result {
            Ok(()) => StepOutcome::Provisioned,
            Err(e) => StepOutcome::Failed(e),
        }
    }
}

/// Outcome of an ensure pass
#[derive(Debug)]
pub struct EnsureReport {
    pub data: ProvisioningData,
    pub user: StepOutcome,
    pub index_set: StepOutcome,
    pub stream: StepOutcome,
}

impl EnsureReport {
    /// Per-step outcomes in execution order
    pub fn outcomes(&self) -> [(ConditionType, &StepOutcome); 3] {
        [
            (ConditionType::UserProvisioned, &self.user),
            (ConditionType::IndexSetProvisioned, &self.index_set),
            (ConditionType::StreamProvisioned, &self.stream),
        ]
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes()
            .iter()
            .all(|(_, outcome)| !matches!(outcome, StepOutcome::Failed(_)))
    }

    /// The error of the first failed step, consuming the report
    pub fn into_first_error(self) -> Option<ProvisionError> {
        [self.user, self.index_set, self.stream]
            .into_iter()
            .find_map(|outcome| match outcome {
                StepOutcome::Failed(e) => Some(e),
                _ => None,
            })
    }
}

fn step_label(step: ConditionType) -> &'static str {
    match step {
        ConditionType::UserProvisioned => "user",
        ConditionType::IndexSetProvisioned => "index_set",
        ConditionType::StreamProvisioned => "stream",
    }
}

fn record(step: ConditionType, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Failed(e) => warn!("{} step failed: {}", step_label(step), e),
        StepOutcome::Provisioned => info!("{} step done", step_label(step)),
        StepOutcome::Skipped => info!("{} step skipped, already provisioned", step_label(step)),
    }
    metrics::record_provisioning_step(step_label(step), outcome.label());
}

/// Run the three provisioning steps in order
///
/// Steps listed in `skip` are not attempted and reported as skipped.
/// The stream step runs even when earlier steps failed, with whatever IDs
/// are known at that point.
pub async fn ensure(
    provider: &dyn GraylogProvider,
    mut data: ProvisioningData,
    skip: &BTreeSet<ConditionType>,
) -> EnsureReport {
    let name = data.name.clone();

    let user = if skip.contains(&ConditionType::UserProvisioned) {
        StepOutcome::Skipped
    } else {
        StepOutcome::from_result(user::ensure_user(provider, &name, &mut data.user).await)
    };
    record(ConditionType::UserProvisioned, &user);

    let index_set = if skip.contains(&ConditionType::IndexSetProvisioned) {
        StepOutcome::Skipped
    } else {
        StepOutcome::from_result(
            index_set::ensure_index_set(provider, &name, &mut data.index_set).await,
        )
    };
    record(ConditionType::IndexSetProvisioned, &index_set);

    let stream = if skip.contains(&ConditionType::StreamProvisioned) {
        StepOutcome::Skipped
    } else {
        StepOutcome::from_result(
            stream::ensure_stream(
                provider,
                &name,
                &mut data.stream,
                &data.index_set.id,
                &data.user.id,
            )
            .await,
        )
    };
    record(ConditionType::StreamProvisioned, &stream);

    EnsureReport {
        data,
        user,
        index_set,
        stream,
    }
}

/// Delete the Graylog objects in reverse dependency order
///
/// Empty IDs are skipped. Each ID is cleared right after its object is
/// deleted, so on failure `ids` holds exactly the objects still present.
///
/// # Errors
///
/// Returns the first delete failure unchanged.
pub async fn teardown(
    provider: &dyn GraylogProvider,
    ids: &mut GraylogStatus,
) -> Result<(), ProvisionError> {
    if !ids.stream_id.is_empty() {
        info!("Deleting stream {}", ids.stream_id);
        provider.delete_stream(&ids.stream_id).await?;
        ids.stream_id.clear();
    }

    if !ids.index_set_id.is_empty() {
        info!("Deleting index set {}", ids.index_set_id);
        provider.delete_index_set(&ids.index_set_id).await?;
        ids.index_set_id.clear();
    }

    if !ids.user_id.is_empty() {
        info!("Deleting user {}", ids.user_id);
        provider.delete_user(&ids.user_id).await?;
        ids.user_id.clear();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGraylog;

    fn data(name: &str) -> ProvisioningData {
        let defaults = ProvisioningDefaults {
            user_roles: vec!["Reader".to_string()],
            index_set_template: "T".to_string(),
            stream_rule_field: "ns".to_string(),
        };
        ProvisioningData::new(name, "initial", &defaults, &GraylogStatus::default())
    }

    fn no_skip() -> BTreeSet<ConditionType> {
        BTreeSet::new()
    }

    #[tokio::test]
    async fn test_first_pass_creates_everything() {
        let graylog = FakeGraylog::with_template("T");

        let report = ensure(&graylog, data("acme"), &no_skip()).await;

        assert!(report.is_success());
        assert!(!report.data.user.id.is_empty());
        assert!(!report.data.index_set.id.is_empty());
        assert!(!report.data.stream.id.is_empty());
        assert_eq!(
            graylog.create_calls(),
            vec![
                "POST /api/users".to_string(),
                "POST /api/system/indices/index_sets".to_string(),
                "POST /api/streams".to_string(),
            ]
        );

        let stream = graylog.created_streams().pop().unwrap();
        assert_eq!(stream.title, "acme");
        assert_eq!(stream.index_set_id, report.data.index_set.id);
        assert_eq!(stream.rules[0].field, "ns");
        assert_eq!(stream.rules[0].value, "acme");
        assert!(stream.remove_matches_from_default_stream);

        let calls = graylog.calls();
        let stream_id = &report.data.stream.id;
        assert!(calls.contains(&format!("POST /api/streams/{stream_id}/resume")));
        assert!(calls.contains(&format!(
            "POST /api/authz/shares/entities/grn::::stream:{stream_id}"
        )));
        let share = graylog.shares().pop().unwrap();
        assert_eq!(
            share
                .1
                .selected_grantee_capabilities
                .get(&format!("grn::::user:{}", report.data.user.id))
                .map(String::as_str),
            Some("view")
        );
    }

    #[tokio::test]
    async fn test_second_pass_is_idempotent() {
        let graylog = FakeGraylog::with_template("T");
        let first = ensure(&graylog, data("acme"), &no_skip()).await;
        let creates_after_first = graylog.create_calls().len();

        let second = ensure(&graylog, data("acme"), &no_skip()).await;

        assert!(second.is_success());
        assert_eq!(graylog.create_calls().len(), creates_after_first);
        assert_eq!(first.data.ids(), second.data.ids());
    }

    #[tokio::test]
    async fn test_missing_template_fails_only_index_set_step() {
        let graylog = FakeGraylog::default();

        let report = ensure(&graylog, data("acme"), &no_skip()).await;

        assert!(matches!(report.user, StepOutcome::Provisioned));
        assert!(matches!(
            report.index_set,
            StepOutcome::Failed(ProvisionError::TemplateNotFound { ref template }) if template == "T"
        ));
        assert!(report.data.index_set.id.is_empty());
        // the stream is still created, without an index set
        assert!(matches!(report.stream, StepOutcome::Provisioned));
        let stream = graylog.created_streams().pop().unwrap();
        assert_eq!(stream.index_set_id, "");
        assert!(!graylog
            .calls()
            .contains(&"POST /api/system/indices/index_sets".to_string()));
    }

    #[tokio::test]
    async fn test_user_failure_does_not_stop_later_steps() {
        let graylog = FakeGraylog::with_template("T");
        graylog.fail_on("GET /api/users/acme", 500);

        let report = ensure(&graylog, data("acme"), &no_skip()).await;

        assert!(matches!(report.user, StepOutcome::Failed(_)));
        assert!(matches!(report.index_set, StepOutcome::Provisioned));
        assert!(matches!(report.stream, StepOutcome::Provisioned));
        // the share grant went to an empty user ID
        let share = graylog.shares().pop().unwrap();
        assert!(share
            .1
            .selected_grantee_capabilities
            .contains_key("grn::::user:"));
        let error = report.into_first_error().unwrap();
        assert_eq!(
            error.to_string(),
            "GET /api/users/acme status 500, 200 expected: injected failure"
        );
    }

    #[tokio::test]
    async fn test_skipped_steps_make_no_calls() {
        let graylog = FakeGraylog::with_template("T");
        let skip: BTreeSet<ConditionType> = ConditionType::ALL.into_iter().collect();

        let report = ensure(&graylog, data("acme"), &skip).await;

        assert!(report.is_success());
        assert!(matches!(report.user, StepOutcome::Skipped));
        assert!(graylog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_order_and_clears_ids() {
        let graylog = FakeGraylog::with_template("T");
        let report = ensure(&graylog, data("acme"), &no_skip()).await;
        let mut ids = report.data.ids();
        let expected = vec![
            format!("DELETE /api/streams/{}", ids.stream_id),
            format!("DELETE /api/system/indices/index_sets/{}", ids.index_set_id),
            format!("DELETE /api/users/{}", ids.user_id),
        ];
        graylog.clear_calls();

        teardown(&graylog, &mut ids).await.unwrap();

        assert_eq!(graylog.calls(), expected);
        assert_eq!(ids, GraylogStatus::default());
    }

    #[tokio::test]
    async fn test_teardown_stops_at_first_failure() {
        let graylog = FakeGraylog::with_template("T");
        let report = ensure(&graylog, data("acme"), &no_skip()).await;
        let mut ids = report.data.ids();
        let before = ids.clone();
        graylog.fail_on(&format!("DELETE /api/streams/{}", ids.stream_id), 500);
        graylog.clear_calls();

        let err = teardown(&graylog, &mut ids).await.unwrap_err();

        assert!(matches!(err, ProvisionError::Graylog(_)));
        assert_eq!(graylog.calls().len(), 1);
        assert_eq!(ids, before);
    }

    #[tokio::test]
    async fn test_teardown_keeps_ids_of_undeleted_objects() {
        let graylog = FakeGraylog::with_template("T");
        let report = ensure(&graylog, data("acme"), &no_skip()).await;
        let mut ids = report.data.ids();
        graylog.fail_on(
            &format!("DELETE /api/system/indices/index_sets/{}", ids.index_set_id),
            500,
        );

        teardown(&graylog, &mut ids).await.unwrap_err();

        assert!(ids.stream_id.is_empty());
        assert!(!ids.index_set_id.is_empty());
        assert!(!ids.user_id.is_empty());
    }

    #[tokio::test]
    async fn test_teardown_skips_empty_ids() {
        let graylog = FakeGraylog::default();
        let mut ids = GraylogStatus {
            user_id: "u1".to_string(),
            ..GraylogStatus::default()
        };
        graylog.insert_user("u1", "acme");

        teardown(&graylog, &mut ids).await.unwrap();

        assert_eq!(graylog.calls(), vec!["DELETE /api/users/u1".to_string()]);
    }
}
