//! StateStore port - where integration state is kept
//!
//! Implemented by the remote store, the local file store, and test fakes.
//! The remote store composes over any implementation as its fallback.

use async_trait::async_trait;

use crate::domain::{IntegrationState, ProjectName, StateError};

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the last saved state. `StateError::NotFound` when there is none.
    async fn load_state(&self, project: &ProjectName) -> Result<IntegrationState, StateError>;

    /// Persist `state` under `state.project`, replacing any previous copy.
    async fn save_state(&self, state: &IntegrationState) -> Result<(), StateError>;

    /// Whether a previous state exists. "No" is `Ok(false)`, never an error.
    async fn has_previous_state(&self, project: &ProjectName) -> Result<bool, StateError>;
}
