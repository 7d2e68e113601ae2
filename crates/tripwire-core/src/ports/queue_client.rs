//! QueueClient port - message queue
//!
//! Wire protocol and authentication belong to the implementation; the
//! trigger only needs receive and delete-by-receipt.

use async_trait::async_trait;

use crate::domain::{QueueError, QueueUrl, ReceiptHandle, ReceivedMessage};

/// Receive/delete access to a named queue.
///
/// # Guarantees
/// - Received messages stay on the queue until deleted by receipt
/// - A message that is not deleted is eventually redelivered
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Receive up to `max_count` pending messages. An empty vec means the
    /// queue had nothing visible.
    async fn receive(
        &self,
        queue: &QueueUrl,
        max_count: u32,
    ) -> Result<Vec<ReceivedMessage>, QueueError>;

    /// Acknowledge one delivery.
    async fn delete(&self, queue: &QueueUrl, receipt: &ReceiptHandle) -> Result<(), QueueError>;
}
