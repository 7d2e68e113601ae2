//! State - integration state persistence.
//!
//! `StateStoreKind` is the closed set of stores a project can be configured
//! with. The remote store always carries a local fallback, even when the
//! fallback is disabled, so it can be switched on without rebuilding.

mod remote;

pub use remote::{RemoteStateConfig, RemoteStateStore, STATE_CONTENT_TYPE, object_key};

use async_trait::async_trait;

use crate::domain::{IntegrationState, ProjectName, StateError};
use crate::impls::FileStateStore;
use crate::ports::StateStore;

pub enum StateStoreKind {
    Remote(RemoteStateStore),
    Local(FileStateStore),
}

impl StateStoreKind {
    pub fn describe(&self) -> String {
        match self {
            StateStoreKind::Remote(store) => format!("remote bucket `{}`", store.config().bucket),
            StateStoreKind::Local(store) => format!("local directory {}", store.directory().display()),
        }
    }
}

#[async_trait]
impl StateStore for StateStoreKind {
    async fn load_state(&self, project: &ProjectName) -> Result<IntegrationState, StateError> {
        match self {
            StateStoreKind::Remote(store) => store.load_state(project).await,
            StateStoreKind::Local(store) => store.load_state(project).await,
        }
    }

    async fn save_state(&self, state: &IntegrationState) -> Result<(), StateError> {
        match self {
            StateStoreKind::Remote(store) => store.save_state(state).await,
            StateStoreKind::Local(store) => store.save_state(state).await,
        }
    }

    async fn has_previous_state(&self, project: &ProjectName) -> Result<bool, StateError> {
        match self {
            StateStoreKind::Remote(store) => store.has_previous_state(project).await,
            StateStoreKind::Local(store) => store.has_previous_state(project).await,
        }
    }
}
