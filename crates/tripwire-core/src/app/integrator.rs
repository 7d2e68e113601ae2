//! Integrator - the build callback a `ProjectCycle` runs when its trigger
//! asks for an integration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BuildCondition, IntegrationState, IntegrationStatus, ProjectName};

/// Everything the host knows when an integration starts.
#[derive(Debug)]
pub struct IntegrationRequest<'a> {
    pub project: &'a ProjectName,
    pub condition: BuildCondition,
    /// Name of the trigger that asked for the build.
    pub source: &'a str,
    pub previous: Option<&'a IntegrationState>,
    pub started_at: DateTime<Utc>,
}

#[async_trait]
pub trait Integrator: Send + Sync {
    /// Run the integration and return the state to persist.
    async fn integrate(&self, request: IntegrationRequest<'_>) -> IntegrationState;
}

/// Succeeds every time and numbers labels 1, 2, 3, ...
///
/// Stands in for a real build in the CLI simulation and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingIntegrator;

#[async_trait]
impl Integrator for CountingIntegrator {
    async fn integrate(&self, request: IntegrationRequest<'_>) -> IntegrationState {
        let number = request
            .previous
            .and_then(|p| p.label.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;

        let mut state = IntegrationState::new(
            request.project.clone(),
            number.to_string(),
            IntegrationStatus::Success,
            request.condition,
            request.started_at,
        )
        .finished_at(request.started_at)
        .requested_by(request.source);
        state.last_successful_label = request
            .previous
            .and_then(|p| p.latest_successful_label())
            .map(str::to_string);
        state
    }
}
