//! Builders from validated configuration to triggers and state stores.
//!
//! Clients are obtained from the [`ServiceClientFactory`] once per trigger
//! or store, with that component's own credential pair.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::error::ConfigError;
use super::model::{ProjectConfig, StateConfig, TriggerConfig, TripwireConfig};
use crate::domain::{ProjectName, QueueUrl};
use crate::impls::FileStateStore;
use crate::ports::ServiceClientFactory;
use crate::state::{RemoteStateConfig, RemoteStateStore, StateStoreKind};
use crate::trigger::{
    CompositeTrigger, IntervalTrigger, QueueTrigger, QueueTriggerConfig, TriggerKind,
};

/// A project's trigger and state store, ready to be driven.
pub struct BuiltProject {
    pub name: ProjectName,
    pub trigger: TriggerKind,
    pub state: StateStoreKind,
}

/// Settings shared by every project of one configuration.
pub struct BuildContext<'a> {
    pub factory: &'a dyn ServiceClientFactory,
    pub state_directory: &'a Path,
    pub request_timeout: Option<Duration>,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a TripwireConfig, factory: &'a dyn ServiceClientFactory) -> Self {
        Self {
            factory,
            state_directory: &config.state_directory,
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Build every project. Expects a config that passed `validate_config`.
pub fn build_projects(
    config: &TripwireConfig,
    factory: &dyn ServiceClientFactory,
) -> Result<Vec<BuiltProject>, ConfigError> {
    let ctx = BuildContext::new(config, factory);
    config
        .projects
        .iter()
        .map(|project| build_project(project, &ctx))
        .collect()
}

pub fn build_project(
    project: &ProjectConfig,
    ctx: &BuildContext<'_>,
) -> Result<BuiltProject, ConfigError> {
    Ok(BuiltProject {
        name: ProjectName::new(project.name.trim()),
        trigger: build_trigger(&project.trigger, ctx)?,
        state: build_state_store(&project.state, ctx),
    })
}

pub fn build_trigger(
    trigger: &TriggerConfig,
    ctx: &BuildContext<'_>,
) -> Result<TriggerKind, ConfigError> {
    let built = match trigger {
        TriggerConfig::Queue(settings) => {
            let queue = QueueUrl::parse(&settings.queue_url)
                .map_err(|e| ConfigError::invalid(format!("queue_url: {e}")))?;
            let mut config = QueueTriggerConfig::new(queue);
            if let Some(name) = &settings.name {
                config.name = name.clone();
            }
            config.poll_interval = Duration::from_secs(settings.seconds);
            config.build_condition = settings.build_condition;
            config.max_messages_per_poll = settings.max_messages;
            config.request_timeout = ctx.request_timeout;

            let client = ctx.factory.queue_client(&settings.credentials);
            TriggerKind::Queue(QueueTrigger::new(config, client))
        }
        TriggerConfig::Interval(settings) => {
            let mut interval = IntervalTrigger::new(Duration::from_secs(settings.seconds))
                .with_build_condition(settings.build_condition);
            if let Some(name) = &settings.name {
                interval = interval.with_name(name.clone());
            }
            TriggerKind::Interval(interval)
        }
        TriggerConfig::Composite(settings) => {
            let children = settings
                .triggers
                .iter()
                .map(|child| build_trigger(child, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let mut composite = CompositeTrigger::new(children);
            if let Some(name) = &settings.name {
                composite = composite.with_name(name.clone());
            }
            TriggerKind::Composite(composite)
        }
    };
    Ok(built)
}

pub fn build_state_store(state: &StateConfig, ctx: &BuildContext<'_>) -> StateStoreKind {
    match state {
        StateConfig::Local(settings) => {
            let directory = settings
                .directory
                .clone()
                .unwrap_or_else(|| ctx.state_directory.to_path_buf());
            StateStoreKind::Local(FileStateStore::new(directory))
        }
        StateConfig::Remote(settings) => {
            let config = RemoteStateConfig {
                bucket: settings.bucket.trim().to_string(),
                region: settings.bucket_region,
                fallback_enabled: settings.fallback_to_file_state,
                create_bucket: settings.create_bucket,
                request_timeout: ctx.request_timeout,
            };
            let client = ctx.factory.object_store(&settings.credentials);
            let fallback = FileStateStore::new(PathBuf::from(ctx.state_directory));
            StateStoreKind::Remote(RemoteStateStore::new(config, client, Arc::new(fallback)))
        }
    }
}
