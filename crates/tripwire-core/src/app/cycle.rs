//! ProjectCycle - one project's trigger → build → state loop
//!
//! # Flow
//! 1. `Trigger::fire(now)`
//! 2. On a build request, load the previous state if one exists
//! 3. Run the integrator
//! 4. Save the new state
//! 5. `Trigger::integration_completed(now)`
//!
//! Completion is reported even when the save fails: the build did run, so
//! the messages that asked for it are acknowledged. A failure to read the
//! previous state stops the tick before the build; the trigger stays armed
//! and its messages are redelivered by the queue.

use std::sync::Arc;

use tracing::{error, info};

use super::integrator::{IntegrationRequest, Integrator};
use crate::domain::{IntegrationState, ProjectName, StateError, TriggerDecision};
use crate::ports::{Clock, StateStore};
use crate::trigger::{Trigger, TriggerKind};

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Idle,
    Integrated(IntegrationState),
}

pub struct ProjectCycle {
    project: ProjectName,
    trigger: TriggerKind,
    state: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
}

impl ProjectCycle {
    pub fn new(
        project: ProjectName,
        trigger: TriggerKind,
        state: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            project,
            trigger,
            state,
            clock,
        }
    }

    pub fn project(&self) -> &ProjectName {
        &self.project
    }

    pub fn trigger(&self) -> &TriggerKind {
        &self.trigger
    }

    pub async fn tick(&mut self, integrator: &dyn Integrator) -> Result<CycleOutcome, StateError> {
        let now = self.clock.now();
        let TriggerDecision::BuildRequested { condition, source } = self.trigger.fire(now).await
        else {
            return Ok(CycleOutcome::Idle);
        };

        info!(
            project = %self.project,
            trigger = %source,
            condition = %condition,
            "integration requested"
        );

        let previous = if self.state.has_previous_state(&self.project).await? {
            Some(self.state.load_state(&self.project).await?)
        } else {
            None
        };

        let result = integrator
            .integrate(IntegrationRequest {
                project: &self.project,
                condition,
                source: &source,
                previous: previous.as_ref(),
                started_at: now,
            })
            .await;

        let saved = self.state.save_state(&result).await;
        self.trigger.integration_completed(self.clock.now()).await;

        if let Err(e) = saved {
            error!(project = %self.project, error = %e, "integration state was not saved");
            return Err(e);
        }

        info!(project = %self.project, label = %result.label, "integration completed");
        Ok(CycleOutcome::Integrated(result))
    }
}
