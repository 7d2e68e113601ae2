//! CompositeTrigger - requests a build when any child trigger does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Trigger, TriggerKind};
use crate::domain::TriggerDecision;

pub struct CompositeTrigger {
    name: String,
    triggers: Vec<TriggerKind>,
}

impl CompositeTrigger {
    pub fn new(triggers: Vec<TriggerKind>) -> Self {
        Self {
            name: "compositeTrigger".to_string(),
            triggers,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn triggers(&self) -> &[TriggerKind] {
        &self.triggers
    }
}

#[async_trait]
impl Trigger for CompositeTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    /// Earliest child deadline; `None` if any child could fire now.
    fn next_build(&self) -> Option<DateTime<Utc>> {
        let mut earliest: Option<DateTime<Utc>> = None;
        for trigger in &self.triggers {
            let next = trigger.next_build()?;
            earliest = Some(earliest.map_or(next, |e| e.min(next)));
        }
        earliest
    }

    /// Every child fires each tick so queue children record what they
    /// received; the first request wins.
    async fn fire(&mut self, now: DateTime<Utc>) -> TriggerDecision {
        let mut decision = TriggerDecision::NoRequest;
        for trigger in &mut self.triggers {
            let child = trigger.fire(now).await;
            if !decision.is_requested() && child.is_requested() {
                decision = child;
            }
        }
        decision
    }

    async fn integration_completed(&mut self, now: DateTime<Utc>) {
        for trigger in &mut self.triggers {
            trigger.integration_completed(now).await;
        }
    }
}
