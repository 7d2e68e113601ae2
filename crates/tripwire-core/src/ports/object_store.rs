//! ObjectStoreClient port - S3-compatible blob storage

use async_trait::async_trait;

use crate::domain::{BucketRegion, ObjectStoreError};

/// Put/get/list access to named buckets.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Write (or overwrite) an object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;

    /// Fetch an object. `Ok(None)` means the key does not exist.
    async fn get_object(&self, bucket: &str, key: &str)
    -> Result<Option<Vec<u8>>, ObjectStoreError>;

    /// Keys in `bucket` starting with `prefix`.
    async fn list_objects(&self, bucket: &str, prefix: &str)
    -> Result<Vec<String>, ObjectStoreError>;

    /// Create a bucket. Creating a bucket the caller already owns succeeds.
    async fn create_bucket(&self, bucket: &str, region: BucketRegion)
    -> Result<(), ObjectStoreError>;

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ObjectStoreError>;
}
