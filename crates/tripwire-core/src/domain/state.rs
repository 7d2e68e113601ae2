//! Integration state: the snapshot a build host persists between cycles.
//!
//! The stores only transport this value. They never interpret it beyond
//! reading `project` to derive the storage key.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::BuildCondition;
use super::ids::ProjectName;

/// Final status of an integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationStatus {
    Success,
    Failure,
    Exception,
    Cancelled,
    Unknown,
}

/// Serializable snapshot of one build integration, keyed by project.
///
/// Field order and `BTreeMap` properties keep the serialized form stable, so
/// saving equal states twice produces byte-identical documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationState {
    pub project: ProjectName,
    pub label: String,
    pub status: IntegrationStatus,
    pub build_condition: BuildCondition,
    pub start_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_successful_label: Option<String>,

    /// Trigger that requested the integration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl IntegrationState {
    pub fn new(
        project: ProjectName,
        label: impl Into<String>,
        status: IntegrationStatus,
        build_condition: BuildCondition,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            project,
            label: label.into(),
            status,
            build_condition,
            start_time,
            end_time: None,
            last_successful_label: None,
            requested_by: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn finished_at(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn requested_by(mut self, trigger: impl Into<String>) -> Self {
        self.requested_by = Some(trigger.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Label of the most recent successful integration, this one included.
    pub fn latest_successful_label(&self) -> Option<&str> {
        if self.status == IntegrationStatus::Success {
            Some(&self.label)
        } else {
            self.last_successful_label.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> IntegrationState {
        IntegrationState::new(
            ProjectName::new("webapp"),
            "1.0.7",
            IntegrationStatus::Failure,
            BuildCondition::ForceBuild,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("end_time").is_none());
        assert!(json.get("properties").is_none());
        assert_eq!(json["status"], "FAILURE");
    }

    #[test]
    fn latest_successful_label_falls_back_to_previous() {
        let mut state = sample();
        state.last_successful_label = Some("1.0.6".to_string());
        assert_eq!(state.latest_successful_label(), Some("1.0.6"));

        state.status = IntegrationStatus::Success;
        assert_eq!(state.latest_successful_label(), Some("1.0.7"));
    }
}
