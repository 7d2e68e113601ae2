//! ServiceClientFactory port - builds clients from a credential pair
//!
//! Each trigger or store asks the factory once, when it is built from
//! configuration, so every project owns its own client instances.

use std::sync::Arc;

use crate::domain::AccessKeyPair;
use crate::ports::{ObjectStoreClient, QueueClient};

pub trait ServiceClientFactory: Send + Sync {
    fn queue_client(&self, credentials: &AccessKeyPair) -> Arc<dyn QueueClient>;

    fn object_store(&self, credentials: &AccessKeyPair) -> Arc<dyn ObjectStoreClient>;
}
