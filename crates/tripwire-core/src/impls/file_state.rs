//! FileStateStore - StateStore backed by local files
//!
//! One JSON document per project under a state directory. This is the
//! default fallback of the remote store and the `local` state store kind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{IntegrationState, ProjectName, StateError};
use crate::ports::StateStore;

const FILE_SUFFIX: &str = ".state.json";

#[derive(Debug, Clone)]
pub struct FileStateStore {
    directory: PathBuf,
}

impl FileStateStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `<directory>/<project>.state.json`
    pub fn state_path(&self, project: &ProjectName) -> PathBuf {
        self.directory
            .join(format!("{}{FILE_SUFFIX}", project.as_str()))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load_state(&self, project: &ProjectName) -> Result<IntegrationState, StateError> {
        let path = self.state_path(project);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StateError::NotFound(project.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save_state(&self, state: &IntegrationState) -> Result<(), StateError> {
        let path = self.state_path(&state.project);
        let body = serde_json::to_vec_pretty(state)?;

        tokio::fs::create_dir_all(&self.directory).await?;

        // Write beside the target and rename so a crash never leaves a torn file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(project = %state.project, path = %path.display(), "saved state file");
        Ok(())
    }

    async fn has_previous_state(&self, project: &ProjectName) -> Result<bool, StateError> {
        Ok(tokio::fs::try_exists(self.state_path(project)).await?)
    }
}
