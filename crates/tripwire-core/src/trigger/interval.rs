//! IntervalTrigger - requests a build once the interval since the last
//! completed integration has elapsed.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{IntervalGate, Trigger};
use crate::domain::{BuildCondition, TriggerDecision};

pub struct IntervalTrigger {
    name: String,
    gate: IntervalGate,
    build_condition: BuildCondition,
}

impl IntervalTrigger {
    pub fn new(interval: Duration) -> Self {
        Self {
            name: "intervalTrigger".to_string(),
            gate: IntervalGate::new(interval),
            build_condition: BuildCondition::IfModificationExists,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_build_condition(mut self, condition: BuildCondition) -> Self {
        self.build_condition = condition;
        self
    }
}

#[async_trait]
impl Trigger for IntervalTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_build(&self) -> Option<DateTime<Utc>> {
        self.gate.next_open()
    }

    async fn fire(&mut self, now: DateTime<Utc>) -> TriggerDecision {
        if !self.gate.is_open(now) {
            return TriggerDecision::NoRequest;
        }
        debug!(trigger = %self.name, "interval elapsed");
        TriggerDecision::build_requested(self.build_condition, &self.name)
    }

    async fn integration_completed(&mut self, now: DateTime<Utc>) {
        self.gate.reset(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    #[tokio::test]
    async fn fires_until_an_integration_completes() {
        let mut trigger = IntervalTrigger::new(Duration::from_secs(60));

        let first = trigger.fire(t(0)).await;
        assert_eq!(first.condition(), Some(BuildCondition::IfModificationExists));
        assert!(trigger.fire(t(1)).await.is_requested());

        trigger.integration_completed(t(2)).await;
        assert_eq!(trigger.fire(t(61)).await, TriggerDecision::NoRequest);
        assert!(trigger.fire(t(62)).await.is_requested());
    }

    #[tokio::test]
    async fn reports_itself_as_the_source() {
        let mut trigger = IntervalTrigger::new(Duration::from_secs(1))
            .with_name("nightly")
            .with_build_condition(BuildCondition::ForceBuild);

        assert_eq!(
            trigger.fire(t(0)).await,
            TriggerDecision::BuildRequested {
                condition: BuildCondition::ForceBuild,
                source: "nightly".to_string(),
            }
        );
    }
}
