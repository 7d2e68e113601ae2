//! Errors - remote faults and state store failures.
//!
//! Remote faults (`QueueError`, `ObjectStoreError`) are what the capability
//! ports return. Whether a fault is recovered locally or surfaced to the host
//! is decided by the component that calls the port, not by the fault itself.

use std::time::Duration;

use thiserror::Error;

use super::ids::ProjectName;

/// Fault reported by a [`crate::ports::QueueClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue transport failure: {0}")]
    Transport(String),

    #[error("queue service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("queue call timed out after {0:?}")]
    Timeout(Duration),
}

/// Fault reported by a [`crate::ports::ObjectStoreClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStoreError {
    #[error("bucket `{0}` does not exist")]
    NoSuchBucket(String),

    #[error("object store transport failure: {0}")]
    Transport(String),

    #[error("object store service error: {0}")]
    Service(String),

    #[error("object store call timed out after {0:?}")]
    Timeout(Duration),
}

impl ObjectStoreError {
    /// A missing bucket means "nothing stored yet", not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ObjectStoreError::NoSuchBucket(_))
    }
}

/// Why a remote state read or write failed.
#[derive(Debug, Error)]
pub enum RemoteFault {
    #[error(transparent)]
    Store(#[from] ObjectStoreError),

    #[error("state document could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("object `{0}` was listed but could not be fetched")]
    Vanished(String),

    #[error("object `{0}` is empty")]
    Empty(String),
}

/// Failure of a [`crate::ports::StateStore`] operation.
#[derive(Debug, Error)]
pub enum StateError {
    /// No state exists for the project anywhere the store is allowed to look.
    #[error("no state found for project {0}")]
    NotFound(ProjectName),

    /// The remote copy is known to exist but could not be read.
    #[error("error loading state for project {project} from the remote store")]
    Load {
        project: ProjectName,
        #[source]
        source: RemoteFault,
    },

    /// The remote write failed. Any enabled fallback write has already run.
    #[error("failed to save state for project {project} to the remote store")]
    Save {
        project: ProjectName,
        #[source]
        source: RemoteFault,
    },

    /// The fallback store failed after the remote operation succeeded.
    #[error("fallback state store failed")]
    Fallback(#[source] Box<StateError>),

    #[error("state file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StateError {
    pub fn is_not_found(&self) -> bool {
        match self {
            StateError::NotFound(_) => true,
            StateError::Fallback(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn save_error_keeps_remote_cause() {
        let err = StateError::Save {
            project: ProjectName::new("webapp"),
            source: RemoteFault::Store(ObjectStoreError::Transport("reset".into())),
        };
        assert_eq!(
            err.to_string(),
            "failed to save state for project webapp to the remote store"
        );
        let cause = err.source().unwrap().to_string();
        assert!(cause.contains("reset"));
    }

    #[test]
    fn not_found_is_seen_through_fallback() {
        let inner = StateError::NotFound(ProjectName::new("webapp"));
        assert!(StateError::Fallback(Box::new(inner)).is_not_found());
        assert!(!StateError::Io(std::io::Error::other("disk")).is_not_found());
    }

    #[test]
    fn missing_bucket_is_not_found() {
        assert!(ObjectStoreError::NoSuchBucket("b".into()).is_not_found());
        assert!(!ObjectStoreError::Timeout(Duration::from_secs(1)).is_not_found());
    }
}
