//! Configuration model.
//!
//! The top level and `[[projects]]` entries reject unknown keys. Trigger and
//! state tables are internally tagged by `type` and embed a credential pair,
//! so they cannot also deny unknown keys.

use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::{AccessKeyPair, BucketRegion, BuildCondition};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TripwireConfig {
    /// Root directory of file-backed state.
    #[serde(default = "default_state_directory")]
    pub state_directory: PathBuf,

    /// Deadline in seconds for every remote call. Unset means no deadline.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

impl Default for TripwireConfig {
    fn default() -> Self {
        Self {
            state_directory: default_state_directory(),
            request_timeout_secs: None,
            projects: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerConfig {
    Queue(QueueTriggerSettings),
    Interval(IntervalTriggerSettings),
    Composite(CompositeTriggerSettings),
}

impl TriggerConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerConfig::Queue(_) => "queue",
            TriggerConfig::Interval(_) => "interval",
            TriggerConfig::Composite(_) => "composite",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueueTriggerSettings {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub queue_url: String,

    #[serde(flatten)]
    pub credentials: AccessKeyPair,

    /// Poll interval in seconds.
    #[serde(default = "default_poll_seconds")]
    pub seconds: u64,

    #[serde(default = "default_queue_condition")]
    pub build_condition: BuildCondition,

    #[serde(default = "default_max_messages")]
    pub max_messages: u32,
}

#[derive(Debug, Deserialize)]
pub struct IntervalTriggerSettings {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_interval_seconds")]
    pub seconds: u64,

    #[serde(default = "default_interval_condition")]
    pub build_condition: BuildCondition,
}

#[derive(Debug, Deserialize)]
pub struct CompositeTriggerSettings {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateConfig {
    Remote(RemoteStateSettings),
    Local(LocalStateSettings),
}

impl Default for StateConfig {
    fn default() -> Self {
        StateConfig::Local(LocalStateSettings::default())
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoteStateSettings {
    #[serde(default)]
    pub bucket: String,

    #[serde(default)]
    pub bucket_region: BucketRegion,

    #[serde(flatten)]
    pub credentials: AccessKeyPair,

    #[serde(default)]
    pub fallback_to_file_state: bool,

    #[serde(default = "default_true")]
    pub create_bucket: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocalStateSettings {
    /// Overrides the top-level `state_directory` for this project.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_state_directory() -> PathBuf {
    PathBuf::from("state")
}

fn default_poll_seconds() -> u64 {
    30
}

fn default_interval_seconds() -> u64 {
    60
}

fn default_queue_condition() -> BuildCondition {
    BuildCondition::ForceBuild
}

fn default_interval_condition() -> BuildCondition {
    BuildCondition::IfModificationExists
}

fn default_max_messages() -> u32 {
    10
}

fn default_true() -> bool {
    true
}
