//! Queue messages as seen by a trigger.

use serde::{Deserialize, Serialize};

use super::ids::{MessageId, ReceiptHandle};

/// One message returned by [`crate::ports::QueueClient::receive`].
///
/// The body is carried through for diagnostics only; a message's presence
/// is the build signal, its content has no meaning to the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub id: MessageId,
    pub receipt: ReceiptHandle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ReceivedMessage {
    pub fn new(id: MessageId, receipt: ReceiptHandle) -> Self {
        Self {
            id,
            receipt,
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A received message that has not been acknowledged yet.
///
/// Owned by the trigger that received it until the integration it caused
/// completes. If the process dies first the message stays on the queue and
/// is redelivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingMessage {
    pub id: MessageId,
    pub receipt: ReceiptHandle,
}

impl From<ReceivedMessage> for PendingMessage {
    fn from(message: ReceivedMessage) -> Self {
        Self {
            id: message.id,
            receipt: message.receipt,
        }
    }
}
