//! # Status Tracking
//!
//! Folds provisioning outcomes into the `LoggingSetup` status.
//!
//! Conditions are kept in a ledger with exactly one entry per condition type.
//! `lastTransitionTime` only moves when a condition flips between True and False.

use crate::config::ProvisioningPolicy;
use crate::controller::provisioner::{EnsureReport, StepOutcome};
use crate::crd::{Condition, ConditionType, GraylogStatus, LoggingSetupStatus};
use std::collections::{BTreeMap, BTreeSet};

pub const STATUS_TRUE: &str = "True";
pub const STATUS_FALSE: &str = "False";
pub const REASON_DONE: &str = "Done";
pub const REASON_FAILED: &str = "Failed";

/// One condition per [`ConditionType`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionLedger {
    entries: BTreeMap<ConditionType, Condition>,
}

impl ConditionLedger {
    /// Load from a persisted list; unknown types are dropped and a later
    /// duplicate replaces an earlier one
    pub fn from_conditions(conditions: &[Condition]) -> Self {
        let entries = conditions
            .iter()
            .filter_map(|c| ConditionType::parse(&c.r#type).map(|t| (t, c.clone())))
            .collect();
        Self { entries }
    }

    /// Write a condition, replacing the entry of the same type
    pub fn set(&mut self, kind: ConditionType, ok: bool, message: Option<String>, now: &str) {
        let status = if ok { STATUS_TRUE } else { STATUS_FALSE };
        let reason = if ok { REASON_DONE } else { REASON_FAILED };

        let last_transition_time = match self.entries.get(&kind) {
            Some(existing) if existing.status == status => existing
                .last_transition_time
                .clone()
                .or_else(|| Some(now.to_string())),
            _ => Some(now.to_string()),
        };

        self.entries.insert(
            kind,
            Condition {
                r#type: kind.as_str().to_string(),
                status: status.to_string(),
                last_transition_time,
                reason: Some(reason.to_string()),
                message,
            },
        );
    }

    #[must_use]
    pub fn get(&self, kind: ConditionType) -> Option<&Condition> {
        self.entries.get(&kind)
    }

    #[must_use]
    pub fn is_true(&self, kind: ConditionType) -> bool {
        self.get(kind).is_some_and(|c| c.status == STATUS_TRUE)
    }

    /// Conditions in fixed order: user, index set, stream
    #[must_use]
    pub fn into_conditions(self) -> Vec<Condition> {
        self.entries.into_values().collect()
    }
}

fn persisted_id(ids: &GraylogStatus, kind: ConditionType) -> &str {
    match kind {
        ConditionType::UserProvisioned => &ids.user_id,
        ConditionType::IndexSetProvisioned => &ids.index_set_id,
        ConditionType::StreamProvisioned => &ids.stream_id,
    }
}

/// Steps that are not attempted under `policy`
///
/// With [`ProvisioningPolicy::SkipProvisioned`] a step is skipped when its
/// condition is True and its ID is persisted.
pub fn steps_to_skip(
    status: &LoggingSetupStatus,
    policy: ProvisioningPolicy,
) -> BTreeSet<ConditionType> {
    match policy {
        ProvisioningPolicy::AlwaysRevalidate => BTreeSet::new(),
        ProvisioningPolicy::SkipProvisioned => {
            let ledger = ConditionLedger::from_conditions(&status.conditions);
            ConditionType::ALL
                .into_iter()
                .filter(|kind| {
                    ledger.is_true(*kind) && !persisted_id(&status.graylog, *kind).is_empty()
                })
                .collect()
        }
    }
}

/// Fold an ensure pass into `status`
///
/// IDs known after the pass are copied over, even for failed steps (a stream
/// that was created but not resumed still has to be deleted later). A
/// persisted ID is never replaced by an empty one. Skipped steps leave their
/// condition untouched.
pub fn apply_report(status: &mut LoggingSetupStatus, report: &EnsureReport, now: &str) {
    let mut ledger = ConditionLedger::from_conditions(&status.conditions);

    for (kind, outcome) in report.outcomes() {
        match outcome {
            StepOutcome::Provisioned => ledger.set(kind, true, None, now),
            StepOutcome::Failed(e) => ledger.set(kind, false, Some(e.to_string()), now),
            StepOutcome::Skipped => {}
        }
    }

    let ids = report.data.ids();
    copy_if_set(&mut status.graylog.user_id, &ids.user_id);
    copy_if_set(&mut status.graylog.index_set_id, &ids.index_set_id);
    copy_if_set(&mut status.graylog.stream_id, &ids.stream_id);

    if matches!(report.user, StepOutcome::Provisioned) {
        status.user_name.clone_from(&report.data.name);
    }

    status.conditions = ledger.into_conditions();
}

fn copy_if_set(target: &mut String, value: &str) {
    if !value.is_empty() {
        value.clone_into(target);
    }
}

/// Whether two statuses differ in anything but `lastReconcileTime`
#[must_use]
pub fn status_changed(old: Option<&LoggingSetupStatus>, new: &LoggingSetupStatus) -> bool {
    let Some(old) = old else {
        return true;
    };
    let mut old = old.clone();
    old.last_reconcile_time.clone_from(&new.last_reconcile_time);
    old != *new
}
