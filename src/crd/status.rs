//! # LoggingSetup Status
//!
//! Status types for tracking provisioning state and conditions.

use serde::{Deserialize, Serialize};

/// Status of the LoggingSetup resource
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSetupStatus {
    /// Name of the generated user to log on to Graylog
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    /// IDs of the objects created in Graylog.
    /// These values are not stored anywhere else, do not edit them
    #[serde(default, rename = "graylogInternal")]
    pub graylog: GraylogStatus,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Observed generation
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// Last reconciliation time
    #[serde(default)]
    pub last_reconcile_time: Option<String>,
}

/// Graylog object IDs owned by a LoggingSetup
///
/// An empty ID means the object does not exist. Empty IDs are still
/// serialized so a merge patch overwrites a previously stored ID.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct GraylogStatus {
    #[serde(default, rename = "userID")]
    pub user_id: String,
    #[serde(default, rename = "indexSetID")]
    pub index_set_id: String,
    #[serde(default, rename = "streamID")]
    pub stream_id: String,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

/// The three condition types, one per Graylog object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConditionType {
    UserProvisioned,
    IndexSetProvisioned,
    StreamProvisioned,
}

impl ConditionType {
    pub const ALL: [ConditionType; 3] = [
        ConditionType::UserProvisioned,
        ConditionType::IndexSetProvisioned,
        ConditionType::StreamProvisioned,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::UserProvisioned => "UserProvisioned",
            ConditionType::IndexSetProvisioned => "IndexSetProvisioned",
            ConditionType::StreamProvisioned => "StreamProvisioned",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
