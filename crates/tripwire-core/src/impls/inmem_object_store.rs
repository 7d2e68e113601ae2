//! InMemoryObjectStore - blob storage for development and tests
//!
//! Buckets must be created before objects are written, like the real
//! service. Faults can be injected per operation and stay active until
//! cleared.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{BucketRegion, ObjectStoreError};
use crate::ports::ObjectStoreClient;

/// Operation an injected fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Put,
    Get,
    List,
    CreateBucket,
}

/// An object as stored, with the content type it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug)]
struct Bucket {
    region: BucketRegion,
    objects: BTreeMap<String, StoredObject>,
}

#[derive(Debug, Default)]
struct Inner {
    buckets: HashMap<String, Bucket>,
    faults: HashMap<StoreOperation, ObjectStoreError>,
    calls: HashMap<StoreOperation, usize>,
    latency: Option<Duration>,
}

impl Inner {
    fn enter(&mut self, op: StoreOperation) -> Result<(), ObjectStoreError> {
        *self.calls.entry(op).or_default() += 1;
        match self.faults.get(&op) {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }
}

/// In-memory object store service. Clones share the same buckets.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn inject_fault(&self, op: StoreOperation, fault: ObjectStoreError) {
        self.inner.lock().await.faults.insert(op, fault);
    }

    pub async fn clear_faults(&self) {
        self.inner.lock().await.faults.clear();
    }

    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.inner.lock().await.latency = latency;
    }

    pub async fn calls(&self, op: StoreOperation) -> usize {
        self.inner
            .lock()
            .await
            .calls
            .get(&op)
            .copied()
            .unwrap_or_default()
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let inner = self.inner.lock().await;
        inner
            .buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key))
            .cloned()
    }

    pub async fn bucket_region(&self, bucket: &str) -> Option<BucketRegion> {
        self.inner.lock().await.buckets.get(bucket).map(|b| b.region)
    }

    async fn simulate_latency(&self) {
        let latency = self.inner.lock().await.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        inner.enter(StoreOperation::Put)?;

        let bucket_state = inner
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        bucket_state.objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        inner.enter(StoreOperation::Get)?;

        let bucket_state = inner
            .buckets
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(bucket_state.objects.get(key).map(|o| o.body.clone()))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, ObjectStoreError> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        inner.enter(StoreOperation::List)?;

        let bucket_state = inner
            .buckets
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(bucket_state
            .objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        region: BucketRegion,
    ) -> Result<(), ObjectStoreError> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        inner.enter(StoreOperation::CreateBucket)?;

        inner.buckets.entry(bucket.to_string()).or_insert(Bucket {
            region,
            objects: BTreeMap::new(),
        });
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ObjectStoreError> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;

        let Some(existing) = inner.buckets.get(bucket) else {
            return Err(ObjectStoreError::NoSuchBucket(bucket.to_string()));
        };
        if !existing.objects.is_empty() {
            return Err(ObjectStoreError::Service(format!(
                "bucket `{bucket}` is not empty"
            )));
        }
        inner.buckets.remove(bucket);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_require_an_existing_bucket() {
        let store = InMemoryObjectStore::new();
        let err = store
            .put_object("state", "a.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap_err();
        assert_eq!(err, ObjectStoreError::NoSuchBucket("state".into()));

        store.create_bucket("state", BucketRegion::Eu).await.unwrap();
        store
            .put_object("state", "a.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        assert_eq!(store.bucket_region("state").await, Some(BucketRegion::Eu));
        assert_eq!(
            store.get_object("state", "a.json").await.unwrap(),
            Some(b"{}".to_vec())
        );
    }

    #[tokio::test]
    async fn list_filters_by_prefix() {
        let store = InMemoryObjectStore::new();
        store.create_bucket("state", BucketRegion::Us).await.unwrap();
        for key in ["web.json", "web.json.bak", "api.json"] {
            store
                .put_object("state", key, vec![1], "application/json")
                .await
                .unwrap();
        }
        let keys = store.list_objects("state", "web.json").await.unwrap();
        assert_eq!(keys, vec!["web.json".to_string(), "web.json.bak".to_string()]);
    }

    #[tokio::test]
    async fn creating_an_owned_bucket_twice_keeps_objects() {
        let store = InMemoryObjectStore::new();
        store.create_bucket("state", BucketRegion::Us).await.unwrap();
        store
            .put_object("state", "a.json", vec![1], "application/json")
            .await
            .unwrap();
        store.create_bucket("state", BucketRegion::Us).await.unwrap();
        assert!(store.object("state", "a.json").await.is_some());
        assert_eq!(store.calls(StoreOperation::CreateBucket).await, 2);
    }

    #[tokio::test]
    async fn non_empty_bucket_cannot_be_deleted() {
        let store = InMemoryObjectStore::new();
        store.create_bucket("state", BucketRegion::Us).await.unwrap();
        store
            .put_object("state", "a.json", vec![1], "application/json")
            .await
            .unwrap();
        assert!(matches!(
            store.delete_bucket("state").await,
            Err(ObjectStoreError::Service(_))
        ));
    }

    #[tokio::test]
    async fn injected_fault_persists_until_cleared() {
        let store = InMemoryObjectStore::new();
        store
            .inject_fault(StoreOperation::List, ObjectStoreError::Transport("dns".into()))
            .await;
        assert!(store.list_objects("state", "").await.is_err());
        assert!(store.list_objects("state", "").await.is_err());

        store.clear_faults().await;
        assert_eq!(
            store.list_objects("state", "").await,
            Err(ObjectStoreError::NoSuchBucket("state".into()))
        );
    }
}
