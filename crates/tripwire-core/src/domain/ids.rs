//! Domain identifiers (strongly-typed names and handles).
//!
//! Every string that crosses a port boundary gets its own newtype so a
//! receipt handle can never be passed where a message id is expected, and a
//! project name can never be confused with an object key.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Name of a project owned by the build host.
///
/// Also the stem of the project's state object key (`<name>.json`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Error returned by [`QueueUrl::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidQueueUrl {
    #[error("queue url `{raw}` is not well-formed: {reason}")]
    Malformed { raw: String, reason: String },

    #[error("queue url `{raw}` must use http or https, got `{scheme}`")]
    UnsupportedScheme { raw: String, scheme: String },

    #[error("queue url `{0}` has no host")]
    MissingHost(String),
}

/// Absolute URL of a message queue.
///
/// Only absolute `http`/`https` URLs with a host are accepted; anything else
/// is rejected at configuration time, never mid-poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueUrl(Url);

impl QueueUrl {
    pub fn parse(raw: &str) -> Result<Self, InvalidQueueUrl> {
        let url = Url::parse(raw.trim()).map_err(|e| InvalidQueueUrl::Malformed {
            raw: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(InvalidQueueUrl::UnsupportedScheme {
                    raw: raw.to_string(),
                    scheme: other.to_string(),
                });
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(InvalidQueueUrl::MissingHost(raw.to_string()));
        }

        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for QueueUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Service-assigned identifier of a queue message. Stable across redeliveries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token proving a particular delivery of a message.
///
/// A redelivered message carries a new receipt handle; deletion must use the
/// handle of the delivery being acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
