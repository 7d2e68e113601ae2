//! InMemoryStateStore - StateStore for tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{IntegrationState, ProjectName, StateError};
use crate::ports::StateStore;

#[derive(Debug, Default)]
struct Inner {
    states: HashMap<ProjectName, IntegrationState>,
    fail_saves: bool,
    save_calls: usize,
}

/// Map-backed state store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a state without going through `save_state`.
    pub async fn insert(&self, state: IntegrationState) {
        self.inner
            .lock()
            .await
            .states
            .insert(state.project.clone(), state);
    }

    pub async fn get(&self, project: &ProjectName) -> Option<IntegrationState> {
        self.inner.lock().await.states.get(project).cloned()
    }

    pub async fn set_fail_saves(&self, fail: bool) {
        self.inner.lock().await.fail_saves = fail;
    }

    pub async fn save_calls(&self) -> usize {
        self.inner.lock().await.save_calls
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load_state(&self, project: &ProjectName) -> Result<IntegrationState, StateError> {
        self.get(project)
            .await
            .ok_or_else(|| StateError::NotFound(project.clone()))
    }

    async fn save_state(&self, state: &IntegrationState) -> Result<(), StateError> {
        let mut inner = self.inner.lock().await;
        inner.save_calls += 1;
        if inner.fail_saves {
            return Err(StateError::Io(std::io::Error::other("injected save failure")));
        }
        inner.states.insert(state.project.clone(), state.clone());
        Ok(())
    }

    async fn has_previous_state(&self, project: &ProjectName) -> Result<bool, StateError> {
        Ok(self.inner.lock().await.states.contains_key(project))
    }
}
