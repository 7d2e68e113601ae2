//! InMemoryQueueClient - message queue for development and tests
//!
//! Behaves like a visibility-timeout queue: a received message is hidden
//! (in flight) until it is deleted by receipt, or until
//! [`InMemoryQueueClient::expire_in_flight`] simulates the visibility timeout
//! lapsing, after which it is redelivered under a fresh receipt handle.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::domain::{MessageId, QueueError, QueueUrl, ReceiptHandle, ReceivedMessage};
use crate::ports::QueueClient;

#[derive(Debug, Clone)]
struct StoredMessage {
    id: MessageId,
    body: String,
}

#[derive(Debug, Default)]
struct QueueState {
    visible: VecDeque<StoredMessage>,
    /// receipt -> message
    in_flight: HashMap<ReceiptHandle, StoredMessage>,
}

#[derive(Debug, Default)]
struct Inner {
    queues: HashMap<String, QueueState>,
    receive_faults: VecDeque<QueueError>,
    failing_deletes: HashSet<MessageId>,
    receive_calls: usize,
    delete_calls: Vec<ReceiptHandle>,
    latency: Option<Duration>,
}

/// In-memory queue service. Clones share the same queues.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueueClient {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a message on `queue` and return its id.
    pub async fn send(&self, queue: &QueueUrl, body: impl Into<String>) -> MessageId {
        let id = MessageId::new(Ulid::new().to_string());
        let mut inner = self.inner.lock().await;
        inner
            .queues
            .entry(queue.to_string())
            .or_default()
            .visible
            .push_back(StoredMessage {
                id: id.clone(),
                body: body.into(),
            });
        id
    }

    /// Make every in-flight message on `queue` visible again.
    pub async fn expire_in_flight(&self, queue: &QueueUrl) {
        let mut inner = self.inner.lock().await;
        if let Some(state) = inner.queues.get_mut(queue.as_str()) {
            let expired: Vec<StoredMessage> = state.in_flight.drain().map(|(_, m)| m).collect();
            state.visible.extend(expired);
        }
    }

    /// Fail the next receive call with `error`. Faults queue up in order.
    pub async fn fail_next_receive(&self, error: QueueError) {
        self.inner.lock().await.receive_faults.push_back(error);
    }

    /// Fail every delete of `id` until cleared.
    pub async fn fail_deletes_of(&self, id: MessageId) {
        self.inner.lock().await.failing_deletes.insert(id);
    }

    pub async fn clear_delete_faults(&self) {
        self.inner.lock().await.failing_deletes.clear();
    }

    /// Delay every call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.inner.lock().await.latency = latency;
    }

    pub async fn visible_count(&self, queue: &QueueUrl) -> usize {
        let inner = self.inner.lock().await;
        inner
            .queues
            .get(queue.as_str())
            .map_or(0, |state| state.visible.len())
    }

    pub async fn in_flight_count(&self, queue: &QueueUrl) -> usize {
        let inner = self.inner.lock().await;
        inner
            .queues
            .get(queue.as_str())
            .map_or(0, |state| state.in_flight.len())
    }

    pub async fn receive_calls(&self) -> usize {
        self.inner.lock().await.receive_calls
    }

    /// Every receipt passed to `delete`, successful or not, in call order.
    pub async fn delete_calls(&self) -> Vec<ReceiptHandle> {
        self.inner.lock().await.delete_calls.clone()
    }

    async fn simulate_latency(&self) {
        let latency = self.inner.lock().await.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl QueueClient for InMemoryQueueClient {
    async fn receive(
        &self,
        queue: &QueueUrl,
        max_count: u32,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        self.simulate_latency().await;

        let mut inner = self.inner.lock().await;
        inner.receive_calls += 1;
        if let Some(error) = inner.receive_faults.pop_front() {
            return Err(error);
        }

        let Some(state) = inner.queues.get_mut(queue.as_str()) else {
            return Ok(Vec::new());
        };

        let take = state.visible.len().min(max_count as usize);
        let mut received = Vec::with_capacity(take);
        for message in state.visible.drain(..take) {
            let receipt = ReceiptHandle::new(Ulid::new().to_string());
            received.push(
                ReceivedMessage::new(message.id.clone(), receipt.clone())
                    .with_body(message.body.clone()),
            );
            state.in_flight.insert(receipt, message);
        }
        Ok(received)
    }

    async fn delete(&self, queue: &QueueUrl, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.simulate_latency().await;

        let mut inner = self.inner.lock().await;
        inner.delete_calls.push(receipt.clone());

        let failing = inner
            .queues
            .get(queue.as_str())
            .and_then(|state| state.in_flight.get(receipt))
            .is_some_and(|message| inner.failing_deletes.contains(&message.id));
        if failing {
            return Err(QueueError::Transport(format!(
                "connection reset while deleting {receipt}"
            )));
        }

        let removed = inner
            .queues
            .get_mut(queue.as_str())
            .and_then(|state| state.in_flight.remove(receipt));
        match removed {
            Some(_) => Ok(()),
            None => Err(QueueError::Service {
                code: "ReceiptHandleIsInvalid".to_string(),
                message: format!("receipt {receipt} is not in flight on {queue}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> QueueUrl {
        QueueUrl::parse("https://queue.test/123/builds").unwrap()
    }

    #[tokio::test]
    async fn receive_hides_messages_until_deleted() {
        let client = InMemoryQueueClient::new();
        client.send(&queue(), "a").await;
        client.send(&queue(), "b").await;

        let received = client.receive(&queue(), 10).await.unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(client.visible_count(&queue()).await, 0);
        assert_eq!(client.in_flight_count(&queue()).await, 2);

        for message in &received {
            client.delete(&queue(), &message.receipt).await.unwrap();
        }
        assert_eq!(client.in_flight_count(&queue()).await, 0);
    }

    #[tokio::test]
    async fn receive_respects_max_count() {
        let client = InMemoryQueueClient::new();
        for i in 0..5 {
            client.send(&queue(), format!("m{i}")).await;
        }
        assert_eq!(client.receive(&queue(), 3).await.unwrap().len(), 3);
        assert_eq!(client.visible_count(&queue()).await, 2);
    }

    #[tokio::test]
    async fn expired_messages_come_back_with_new_receipts() {
        let client = InMemoryQueueClient::new();
        let id = client.send(&queue(), "a").await;

        let first = client.receive(&queue(), 10).await.unwrap();
        client.expire_in_flight(&queue()).await;
        let second = client.receive(&queue(), 10).await.unwrap();

        assert_eq!(first[0].id, id);
        assert_eq!(second[0].id, id);
        assert_ne!(first[0].receipt, second[0].receipt);

        // The stale receipt no longer acknowledges anything.
        let stale = client.delete(&queue(), &first[0].receipt).await;
        assert!(matches!(stale, Err(QueueError::Service { .. })));
    }

    #[tokio::test]
    async fn injected_faults_fire_once_per_call() {
        let client = InMemoryQueueClient::new();
        client
            .fail_next_receive(QueueError::Transport("down".into()))
            .await;

        assert!(client.receive(&queue(), 10).await.is_err());
        assert!(client.receive(&queue(), 10).await.unwrap().is_empty());
        assert_eq!(client.receive_calls().await, 2);
    }
}
