//! InMemoryClientFactory - in-memory services shared by every project
//!
//! Credentials are accepted and ignored. Every client handed out talks to
//! the same queues and buckets, so a test or simulation can seed messages
//! and inspect stored objects through the factory's own handles.

use std::sync::Arc;

use crate::domain::AccessKeyPair;
use crate::impls::{InMemoryObjectStore, InMemoryQueueClient};
use crate::ports::{ObjectStoreClient, QueueClient, ServiceClientFactory};

#[derive(Debug, Clone, Default)]
pub struct InMemoryClientFactory {
    queues: InMemoryQueueClient,
    objects: InMemoryObjectStore,
}

impl InMemoryClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queues(&self) -> &InMemoryQueueClient {
        &self.queues
    }

    pub fn objects(&self) -> &InMemoryObjectStore {
        &self.objects
    }
}

impl ServiceClientFactory for InMemoryClientFactory {
    fn queue_client(&self, _credentials: &AccessKeyPair) -> Arc<dyn QueueClient> {
        Arc::new(self.queues.clone())
    }

    fn object_store(&self, _credentials: &AccessKeyPair) -> Arc<dyn ObjectStoreClient> {
        Arc::new(self.objects.clone())
    }
}
