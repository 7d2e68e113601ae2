//! RemoteStateStore - integration state in an object store bucket, with a
//! local fallback store.
//!
//! # Rules
//! - The remote copy is authoritative: when it exists it wins over the fallback
//! - A remote copy that exists but cannot be read is an error, never a silent
//!   fallback (that would hide corruption)
//! - Every save attempts the remote write first and then, whatever happened
//!   remotely, the fallback write. Losing the remote copy must not also lose
//!   the local one

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::deadline::bounded;
use crate::domain::{
    BucketRegion, IntegrationState, ObjectStoreError, ProjectName, RemoteFault, StateError,
};
use crate::ports::{ObjectStoreClient, StateStore};

pub const STATE_CONTENT_TYPE: &str = "application/json";

/// Object key holding a project's state.
pub fn object_key(project: &ProjectName) -> String {
    format!("{}.json", project.as_str())
}

#[derive(Debug, Clone)]
pub struct RemoteStateConfig {
    pub bucket: String,
    pub region: BucketRegion,
    /// Read from and mirror writes to the fallback store.
    pub fallback_enabled: bool,
    /// Create the bucket before the first write.
    pub create_bucket: bool,
    /// Deadline for each object store call.
    pub request_timeout: Option<Duration>,
}

impl RemoteStateConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: BucketRegion::default(),
            fallback_enabled: false,
            create_bucket: true,
            request_timeout: None,
        }
    }
}

pub struct RemoteStateStore {
    config: RemoteStateConfig,
    client: Arc<dyn ObjectStoreClient>,
    fallback: Arc<dyn StateStore>,
    bucket_ready: AtomicBool,
}

impl RemoteStateStore {
    pub fn new(
        config: RemoteStateConfig,
        client: Arc<dyn ObjectStoreClient>,
        fallback: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            config,
            client,
            fallback,
            bucket_ready: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &RemoteStateConfig {
        &self.config
    }

    /// Does the project's object exist? A missing bucket counts as "no".
    ///
    /// Lists by prefix and requires an exact key match. Never creates the
    /// bucket.
    async fn probe(&self, project: &ProjectName) -> Result<bool, ObjectStoreError> {
        let key = object_key(project);
        let listed = bounded(
            self.config.request_timeout,
            self.client.list_objects(&self.config.bucket, &key),
        )
        .await;
        match listed {
            Ok(keys) => Ok(keys.iter().any(|k| *k == key)),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn fetch(&self, project: &ProjectName) -> Result<IntegrationState, RemoteFault> {
        let key = object_key(project);
        let body = bounded(
            self.config.request_timeout,
            self.client.get_object(&self.config.bucket, &key),
        )
        .await?
        .ok_or_else(|| RemoteFault::Vanished(key.clone()))?;

        if body.is_empty() {
            return Err(RemoteFault::Empty(key));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn ensure_bucket(&self) -> Result<(), ObjectStoreError> {
        if !self.config.create_bucket || self.bucket_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        bounded(
            self.config.request_timeout,
            self.client
                .create_bucket(&self.config.bucket, self.config.region),
        )
        .await?;
        self.bucket_ready.store(true, Ordering::Release);
        info!(bucket = %self.config.bucket, region = ?self.config.region, "state bucket ready");
        Ok(())
    }

    async fn save_remote(&self, state: &IntegrationState) -> Result<(), RemoteFault> {
        let body = serde_json::to_vec_pretty(state)?;
        self.ensure_bucket().await?;
        bounded(
            self.config.request_timeout,
            self.client.put_object(
                &self.config.bucket,
                &object_key(&state.project),
                body,
                STATE_CONTENT_TYPE,
            ),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for RemoteStateStore {
    async fn load_state(&self, project: &ProjectName) -> Result<IntegrationState, StateError> {
        let exists = self.probe(project).await.map_err(|e| StateError::Load {
            project: project.clone(),
            source: e.into(),
        })?;

        if exists {
            debug!(project = %project, bucket = %self.config.bucket, "loading remote state");
            return self.fetch(project).await.map_err(|source| StateError::Load {
                project: project.clone(),
                source,
            });
        }

        if self.config.fallback_enabled {
            debug!(project = %project, "no remote state, loading fallback");
            return self.fallback.load_state(project).await;
        }

        Err(StateError::NotFound(project.clone()))
    }

    async fn save_state(&self, state: &IntegrationState) -> Result<(), StateError> {
        // Capture the remote outcome instead of returning early so the
        // fallback write below always runs.
        let remote = self.save_remote(state).await;

        let fallback = if self.config.fallback_enabled {
            Some(self.fallback.save_state(state).await)
        } else {
            None
        };

        match (remote, fallback) {
            (Err(source), fallback) => {
                if let Some(Err(e)) = fallback {
                    error!(project = %state.project, error = %e, "fallback state save failed");
                }
                error!(
                    project = %state.project,
                    bucket = %self.config.bucket,
                    error = %source,
                    "remote state save failed"
                );
                Err(StateError::Save {
                    project: state.project.clone(),
                    source,
                })
            }
            (Ok(()), Some(Err(e))) => Err(StateError::Fallback(Box::new(e))),
            (Ok(()), _) => {
                info!(project = %state.project, bucket = %self.config.bucket, "saved state");
                Ok(())
            }
        }
    }

    async fn has_previous_state(&self, project: &ProjectName) -> Result<bool, StateError> {
        match self.probe(project).await {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(e) => {
                warn!(
                    project = %project,
                    bucket = %self.config.bucket,
                    error = %e,
                    "remote state probe failed, treating as no remote state"
                );
            }
        }

        if self.config.fallback_enabled {
            return self.fallback.has_previous_state(project).await;
        }
        Ok(false)
    }
}
