//! tripwire - check a trigger configuration or simulate it against
//! in-memory queue and object store services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tripwire_core::app::{
    CountingIntegrator, CycleOutcome, IntegrationRequest, Integrator, ProjectCycle,
};
use tripwire_core::config::{
    BuiltProject, DEFAULT_CONFIG_FILE, TripwireConfig, build_projects, load_and_validate,
    render_errors,
};
use tripwire_core::domain::{IntegrationState, QueueUrl};
use tripwire_core::impls::InMemoryClientFactory;
use tripwire_core::ports::FixedClock;
use tripwire_core::trigger::{Trigger, TriggerKind};

#[derive(Parser, Debug)]
#[command(name = "tripwire", version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate a configuration, then list its projects.
    Check {
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Drive every project against in-memory services on a simulated clock.
    Simulate {
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Ticks to run per project.
        #[arg(long, default_value_t = 10)]
        ticks: u32,

        /// Simulated seconds between ticks.
        #[arg(long, default_value_t = 30)]
        step_secs: i64,

        /// Messages sent to each configured queue before the first tick.
        #[arg(long, default_value_t = 3)]
        messages: usize,

        /// Overrides `state_directory` from the configuration.
        #[arg(long)]
        state_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct ProjectSummary {
    project: String,
    integrations: u32,
    state_errors: u32,
    last_label: Option<String>,
}

/// Counting integrator that logs each simulated build.
struct SimulatedBuild;

#[async_trait]
impl Integrator for SimulatedBuild {
    async fn integrate(&self, request: IntegrationRequest<'_>) -> IntegrationState {
        info!(
            project = %request.project,
            condition = %request.condition,
            requested_by = %request.source,
            "simulated build"
        );
        CountingIntegrator.integrate(request).await
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load(path: &Path) -> Result<TripwireConfig> {
    match load_and_validate(path) {
        Ok(config) => Ok(config),
        Err(errors) => bail!(
            "invalid configuration in {}:\n{}",
            path.display(),
            render_errors(&errors)
        ),
    }
}

fn collect_queues(trigger: &TriggerKind, queues: &mut Vec<QueueUrl>) {
    match trigger {
        TriggerKind::Queue(queue) => queues.push(queue.config().queue.clone()),
        TriggerKind::Interval(_) => {}
        TriggerKind::Composite(composite) => {
            for child in composite.triggers() {
                collect_queues(child, queues);
            }
        }
    }
}

fn check(path: &Path) -> Result<()> {
    let config = load(path)?;
    let projects = build_projects(&config, &InMemoryClientFactory::new())
        .context("building projects")?;

    println!("{}: {} project(s)", path.display(), projects.len());
    for project in &projects {
        let mut queues = Vec::new();
        collect_queues(&project.trigger, &mut queues);
        println!(
            "  {}: trigger `{}`, state {}",
            project.name,
            project.trigger.name(),
            project.state.describe()
        );
        for queue in queues {
            println!("    polls {queue}");
        }
    }
    Ok(())
}

fn step_duration(step_secs: i64) -> Result<chrono::Duration> {
    chrono::Duration::try_seconds(step_secs)
        .with_context(|| format!("--step-secs {step_secs} is out of range"))
}

async fn simulate_project(
    project: BuiltProject,
    ticks: u32,
    step: chrono::Duration,
) -> Result<ProjectSummary> {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let mut cycle = ProjectCycle::new(
        project.name,
        project.trigger,
        Arc::new(project.state),
        clock.clone(),
    );

    let mut summary = ProjectSummary {
        project: cycle.project().to_string(),
        integrations: 0,
        state_errors: 0,
        last_label: None,
    };
    for _ in 0..ticks {
        match cycle.tick(&SimulatedBuild).await {
            Ok(CycleOutcome::Integrated(state)) => {
                summary.integrations += 1;
                summary.last_label = Some(state.label);
            }
            Ok(CycleOutcome::Idle) => {}
            Err(e) => {
                warn!(project = %cycle.project(), error = %e, "tick failed");
                summary.state_errors += 1;
            }
        }
        if clock.advance(step).is_none() {
            bail!(
                "simulated clock for project {} ran past the representable range after {} integration(s)",
                cycle.project(),
                summary.integrations
            );
        }
    }
    Ok(summary)
}

async fn simulate(
    path: &Path,
    ticks: u32,
    step_secs: i64,
    messages: usize,
    state_dir: Option<PathBuf>,
) -> Result<()> {
    let step = step_duration(step_secs)?;
    let mut config = load(path)?;
    if let Some(dir) = state_dir {
        config.state_directory = dir;
    }

    let factory = InMemoryClientFactory::new();
    let projects = build_projects(&config, &factory).context("building projects")?;

    for project in &projects {
        let mut queues = Vec::new();
        collect_queues(&project.trigger, &mut queues);
        for queue in queues {
            for n in 0..messages {
                factory
                    .queues()
                    .send(&queue, format!("simulated change {n}"))
                    .await;
            }
            info!(project = %project.name, queue = %queue, count = messages, "seeded queue");
        }
    }

    let mut tasks = JoinSet::new();
    for project in projects {
        tasks.spawn(simulate_project(project, ticks, step));
    }

    let mut summaries = Vec::new();
    loop {
        tokio::select! {
            joined = tasks.join_next() => match joined {
                Some(summary) => summaries.push(summary.context("project task panicked")??),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted, stopping simulation");
                tasks.abort_all();
                break;
            }
        }
    }

    summaries.sort_by(|a, b| a.project.cmp(&b.project));
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Check { config } => check(&config),
        Commands::Simulate {
            config,
            ticks,
            step_secs,
            messages,
            state_dir,
        } => simulate(&config, ticks, step_secs, messages, state_dir).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_simulate_flags() {
        let cli = Cli::parse_from([
            "tripwire",
            "--log-json",
            "simulate",
            "--config",
            "ci.toml",
            "--ticks",
            "4",
            "--messages",
            "0",
        ]);
        assert!(cli.log_json);
        let Commands::Simulate {
            config,
            ticks,
            step_secs,
            messages,
            state_dir,
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert_eq!(config, PathBuf::from("ci.toml"));
        assert_eq!(ticks, 4);
        assert_eq!(step_secs, 30);
        assert_eq!(messages, 0);
        assert!(state_dir.is_none());
    }

    #[tokio::test]
    async fn simulated_queue_project_integrates_once_per_batch() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
state_directory = "{}"

[[projects]]
name = "webapp"
trigger = {{ type = "queue", queue_url = "https://q.example.com/webapp", aws_access_key = "a", aws_secret_access_key = "b" }}
state = {{ type = "remote", bucket = "build-state", aws_access_key = "a", aws_secret_access_key = "b", fallback_to_file_state = true }}
"#,
            dir.path().display()
        );
        let config = tripwire_core::config::load_and_validate_str(&toml).unwrap();
        let factory = InMemoryClientFactory::new();
        let mut projects = build_projects(&config, &factory).unwrap();
        let url = QueueUrl::parse("https://q.example.com/webapp").unwrap();
        factory.queues().send(&url, "one").await;
        factory.queues().send(&url, "two").await;

        let summary = simulate_project(projects.remove(0), 3, chrono::Duration::seconds(30))
            .await
            .unwrap();

        assert_eq!(summary.integrations, 1);
        assert_eq!(summary.state_errors, 0);
        assert_eq!(summary.last_label.as_deref(), Some("1"));
        assert!(dir.path().join("webapp.state.json").exists());
        assert!(factory.objects().object("build-state", "webapp.json").await.is_some());
    }

    #[tokio::test]
    async fn clock_overflow_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
state_directory = "{}"

[[projects]]
name = "nightly"
trigger = {{ type = "interval", seconds = 60 }}
"#,
            dir.path().display()
        );
        let config = tripwire_core::config::load_and_validate_str(&toml).unwrap();
        let mut projects = build_projects(&config, &InMemoryClientFactory::new()).unwrap();

        let err = simulate_project(projects.remove(0), 3, chrono::Duration::MAX)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("ran past the representable range"));
    }

    #[test]
    fn step_secs_must_fit_a_duration() {
        assert_eq!(step_duration(30).unwrap(), chrono::Duration::seconds(30));
        let err = step_duration(i64::MAX).unwrap_err();
        assert_eq!(err.to_string(), format!("--step-secs {} is out of range", i64::MAX));
    }

    #[tokio::test]
    async fn out_of_range_step_fails_before_loading_the_config() {
        let err = simulate(Path::new("/nonexistent/tripwire.toml"), 1, i64::MIN, 0, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err:#}");
    }
}
