//! QueueTrigger - requests a build when messages are waiting on a queue.
//!
//! # States
//! - Idle -> Armed: a poll returned one or more messages
//! - Armed -> Armed: another poll returned more messages (they accumulate)
//! - Idle/Armed -> Idle: `integration_completed` deleted every pending message
//!
//! Messages are deleted only after the integration they triggered has
//! completed. A crash in between leaves them on the queue, so the build is
//! requested again after redelivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{IntervalGate, Trigger};
use crate::deadline::bounded;
use crate::domain::{BuildCondition, PendingMessage, QueueUrl, ReceivedMessage, TriggerDecision};
use crate::ports::QueueClient;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_MESSAGES: u32 = 10;
/// Largest batch the queue service hands out per receive.
pub const MAX_MESSAGES_CAP: u32 = 10;

/// Immutable settings of one queue trigger.
#[derive(Debug, Clone)]
pub struct QueueTriggerConfig {
    pub name: String,
    pub queue: QueueUrl,
    pub poll_interval: Duration,
    pub build_condition: BuildCondition,
    pub max_messages_per_poll: u32,
    /// Deadline for each receive/delete call.
    pub request_timeout: Option<Duration>,
}

impl QueueTriggerConfig {
    pub fn new(queue: QueueUrl) -> Self {
        Self {
            name: "queueTrigger".to_string(),
            queue,
            poll_interval: DEFAULT_POLL_INTERVAL,
            build_condition: BuildCondition::ForceBuild,
            max_messages_per_poll: DEFAULT_MAX_MESSAGES,
            request_timeout: None,
        }
    }
}

/// Acknowledgement state of a queue trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueueTriggerState {
    /// No unacknowledged messages.
    #[default]
    Idle,

    /// Messages received and waiting for the integration to complete.
    Armed { pending: Vec<PendingMessage> },
}

impl QueueTriggerState {
    pub fn pending(&self) -> &[PendingMessage] {
        match self {
            QueueTriggerState::Idle => &[],
            QueueTriggerState::Armed { pending } => pending,
        }
    }

    /// Add newly received messages, moving to Armed.
    ///
    /// A message already pending under an older receipt keeps only the
    /// newest receipt, the one the queue will accept for deletion.
    fn record(&mut self, received: Vec<ReceivedMessage>) {
        let mut pending = match std::mem::take(self) {
            QueueTriggerState::Idle => Vec::with_capacity(received.len()),
            QueueTriggerState::Armed { pending } => pending,
        };
        for message in received {
            let message = PendingMessage::from(message);
            match pending.iter_mut().find(|p| p.id == message.id) {
                Some(existing) => {
                    debug!(message_id = %message.id, "message redelivered, keeping newest receipt");
                    *existing = message;
                }
                None => pending.push(message),
            }
        }
        *self = QueueTriggerState::Armed { pending };
    }

    fn take_pending(&mut self) -> Vec<PendingMessage> {
        match std::mem::take(self) {
            QueueTriggerState::Idle => Vec::new(),
            QueueTriggerState::Armed { pending } => pending,
        }
    }
}

pub struct QueueTrigger {
    config: QueueTriggerConfig,
    client: Arc<dyn QueueClient>,
    gate: IntervalGate,
    state: QueueTriggerState,
}

impl QueueTrigger {
    pub fn new(config: QueueTriggerConfig, client: Arc<dyn QueueClient>) -> Self {
        let gate = IntervalGate::new(config.poll_interval);
        Self {
            config,
            client,
            gate,
            state: QueueTriggerState::Idle,
        }
    }

    pub fn config(&self) -> &QueueTriggerConfig {
        &self.config
    }

    pub fn state(&self) -> &QueueTriggerState {
        &self.state
    }

    pub fn pending(&self) -> &[PendingMessage] {
        self.state.pending()
    }

    async fn poll(&self) -> Vec<ReceivedMessage> {
        let queue = &self.config.queue;
        info!(trigger = %self.config.name, queue = %queue, "checking for messages");

        let received = bounded(
            self.config.request_timeout,
            self.client.receive(queue, self.config.max_messages_per_poll),
        )
        .await;

        match received {
            Ok(messages) => messages,
            Err(e) => {
                warn!(
                    trigger = %self.config.name,
                    queue = %queue,
                    error = %e,
                    "queue poll failed, treating as no messages"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Trigger for QueueTrigger {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn next_build(&self) -> Option<DateTime<Utc>> {
        self.gate.next_open()
    }

    async fn fire(&mut self, now: DateTime<Utc>) -> TriggerDecision {
        if !self.gate.is_open(now) {
            debug!(trigger = %self.config.name, "poll interval not elapsed");
            return TriggerDecision::NoRequest;
        }
        self.gate.reset(now);

        let received = self.poll().await;
        if received.is_empty() {
            return TriggerDecision::NoRequest;
        }

        info!(
            trigger = %self.config.name,
            queue = %self.config.queue,
            count = received.len(),
            "found messages on queue"
        );

        // No completion ever follows a NoBuild tick, so nothing recorded here
        // would be deleted. The messages stay on the queue and reappear once
        // their visibility timeout lapses.
        if self.config.build_condition == BuildCondition::NoBuild {
            debug!(
                trigger = %self.config.name,
                count = received.len(),
                "build condition is no_build, leaving messages on the queue"
            );
            return TriggerDecision::NoRequest;
        }
        self.state.record(received);

        TriggerDecision::build_requested(self.config.build_condition, &self.config.name)
    }

    async fn integration_completed(&mut self, now: DateTime<Utc>) {
        self.gate.reset(now);

        let pending = self.state.take_pending();
        if pending.is_empty() {
            warn!(
                trigger = %self.config.name,
                queue = %self.config.queue,
                "integration completed with no pending messages"
            );
            return;
        }

        let queue = &self.config.queue;
        for message in pending {
            let deleted = bounded(
                self.config.request_timeout,
                self.client.delete(queue, &message.receipt),
            )
            .await;
            match deleted {
                Ok(()) => {
                    info!(trigger = %self.config.name, queue = %queue, message_id = %message.id, "deleted message");
                }
                Err(e) => {
                    warn!(
                        trigger = %self.config.name,
                        queue = %queue,
                        message_id = %message.id,
                        error = %e,
                        "failed to delete message, it may be redelivered"
                    );
                }
            }
        }
    }
}
