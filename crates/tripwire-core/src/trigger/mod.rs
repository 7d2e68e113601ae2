//! Triggers - decide, once per host tick, whether an integration should run.
//!
//! The set of trigger kinds is closed: configuration picks one
//! [`TriggerKind`] per project at load time.

pub mod composite;
pub mod gate;
pub mod interval;
pub mod queue;

pub use self::composite::CompositeTrigger;
pub use self::gate::IntervalGate;
pub use self::interval::IntervalTrigger;
pub use self::queue::{QueueTrigger, QueueTriggerConfig, QueueTriggerState};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::TriggerDecision;

/// A build trigger driven by the host's tick.
///
/// The host calls `fire` on every tick and `integration_completed` once the
/// integration started by a request has finished. Neither operation fails:
/// remote faults are logged and turned into `NoRequest`.
#[async_trait]
pub trait Trigger: Send + Sync {
    fn name(&self) -> &str;

    /// When the trigger could next request a build. `None` = now.
    fn next_build(&self) -> Option<DateTime<Utc>>;

    async fn fire(&mut self, now: DateTime<Utc>) -> TriggerDecision;

    async fn integration_completed(&mut self, now: DateTime<Utc>);
}

/// Closed set of trigger kinds a project can be configured with.
pub enum TriggerKind {
    Queue(QueueTrigger),
    Interval(IntervalTrigger),
    Composite(CompositeTrigger),
}

#[async_trait]
impl Trigger for TriggerKind {
    fn name(&self) -> &str {
        match self {
            TriggerKind::Queue(t) => t.name(),
            TriggerKind::Interval(t) => t.name(),
            TriggerKind::Composite(t) => t.name(),
        }
    }

    fn next_build(&self) -> Option<DateTime<Utc>> {
        match self {
            TriggerKind::Queue(t) => t.next_build(),
            TriggerKind::Interval(t) => t.next_build(),
            TriggerKind::Composite(t) => t.next_build(),
        }
    }

    async fn fire(&mut self, now: DateTime<Utc>) -> TriggerDecision {
        match self {
            TriggerKind::Queue(t) => t.fire(now).await,
            TriggerKind::Interval(t) => t.fire(now).await,
            TriggerKind::Composite(t) => t.fire(now).await,
        }
    }

    async fn integration_completed(&mut self, now: DateTime<Utc>) {
        match self {
            TriggerKind::Queue(t) => t.integration_completed(now).await,
            TriggerKind::Interval(t) => t.integration_completed(now).await,
            TriggerKind::Composite(t) => t.integration_completed(now).await,
        }
    }
}
