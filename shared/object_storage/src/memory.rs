//! In-memory [`ObjectStorage`] used by tests
//!
//! Buckets and keys live in a map guarded by an async lock. Presigned URLs are
//! signed locally with HMAC-SHA256 so they are deterministic in shape but
//! never valid against a real store. Keys registered with
//! [`InMemoryObjectStorage::with_fault_key`] make `delete_object` panic, which
//! lets callers exercise their recovery path.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use url::Url;

use crate::{BucketObject, ObjectStorage, OperationError, OperationResult};

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_ENDPOINT: &str = "http://localhost:9000";
const DEFAULT_REGION: &str = "eu-west-1";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Object storage kept entirely in process memory
#[derive(Debug)]
pub struct InMemoryObjectStorage {
    endpoint: String,
    region: String,
    signing_key: Vec<u8>,
    buckets: RwLock<HashMap<String, HashSet<String>>>,
    fault_keys: HashSet<String>,
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryObjectStorage {
    /// Creates an empty store with no buckets
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            signing_key: b"in-memory-signing-key".to_vec(),
            buckets: RwLock::new(HashMap::new()),
            fault_keys: HashSet::new(),
        }
    }

    /// Sets the endpoint presigned URLs point to
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the region embedded in the presigned credential scope
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Adds an empty bucket
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.buckets.get_mut().entry(bucket.into()).or_default();
        self
    }

    /// Adds an object, creating its bucket if needed
    #[must_use]
    pub fn with_object(mut self, object: &BucketObject) -> Self {
        self.buckets
            .get_mut()
            .entry(object.bucket().to_string())
            .or_default()
            .insert(object.key().to_string());
        self
    }

    /// Registers a key whose deletion simulates a crash inside the backend
    #[must_use]
    pub fn with_fault_key(mut self, key: impl Into<String>) -> Self {
        let object = BucketObject::new("", key);
        self.fault_keys.insert(object.key().to_string());
        self
    }

    /// Whether `object` currently exists
    pub async fn contains(&self, object: &BucketObject) -> bool {
        self.buckets
            .read()
            .await
            .get(object.bucket())
            .is_some_and(|keys| keys.contains(object.key()))
    }

    /// Records `object` as uploaded, as a client using an upload URL would
    ///
    /// # Errors
    ///
    /// Returns `OperationError::BucketNotFound` if the bucket does not exist
    pub async fn put_object(&self, object: &BucketObject) -> OperationResult<()> {
        let mut buckets = self.buckets.write().await;
        let keys = buckets
            .get_mut(object.bucket())
            .ok_or_else(|| bucket_not_found(object.bucket()))?;
        keys.insert(object.key().to_string());
        Ok(())
    }

    fn presign(&self, method: &str, object: &BucketObject, ttl: Duration) -> OperationResult<String> {
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let credential = format!(
            "in-memory/{}/{}/s3/aws4_request",
            now.format("%Y%m%d"),
            self.region
        );
        let expires = ttl.as_secs().to_string();

        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| OperationError::Unknown(format!("Invalid endpoint {}: {e}", self.endpoint)))?;
        url.set_path(&format!("/{}{}", object.bucket(), object.key()));

        let string_to_sign = format!("{method}\n{}\n{amz_date}\n{credential}\n{expires}", url.path());
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| OperationError::Unknown(format!("Invalid signing key: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        url.query_pairs_mut()
            .append_pair("X-Amz-Algorithm", ALGORITHM)
            .append_pair("X-Amz-Credential", &credential)
            .append_pair("X-Amz-Date", &amz_date)
            .append_pair("X-Amz-Expires", &expires)
            .append_pair("X-Amz-SignedHeaders", "host")
            .append_pair("X-Amz-Signature", &signature);

        Ok(url.to_string())
    }
}

fn bucket_not_found(bucket: &str) -> OperationError {
    OperationError::BucketNotFound {
        bucket: bucket.to_string(),
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn create_upload_url(
        &self,
        object: &BucketObject,
        ttl: Duration,
    ) -> OperationResult<String> {
        if !self.buckets.read().await.contains_key(object.bucket()) {
            return Err(bucket_not_found(object.bucket()));
        }

        self.presign("PUT", object, ttl)
    }

    async fn create_download_url(
        &self,
        object: &BucketObject,
        ttl: Duration,
    ) -> OperationResult<String> {
        {
            let buckets = self.buckets.read().await;
            let keys = buckets
                .get(object.bucket())
                .ok_or_else(|| bucket_not_found(object.bucket()))?;

            if !keys.contains(object.key()) {
                return Err(OperationError::KeyNotFound {
                    bucket: object.bucket().to_string(),
                    key: object.key().to_string(),
                });
            }
        }

        self.presign("GET", object, ttl)
    }

    /// # Panics
    ///
    /// Panics when the key was registered with `with_fault_key`
    async fn delete_object(&self, object: &BucketObject) -> OperationResult<()> {
        assert!(
            !self.fault_keys.contains(object.key()),
            "simulated storage fault while deleting {object}"
        );

        let mut buckets = self.buckets.write().await;
        let keys = buckets
            .get_mut(object.bucket())
            .ok_or_else(|| bucket_not_found(object.bucket()))?;
        keys.remove(object.key());
        Ok(())
    }

    async fn batch_delete(&self, objects: &[BucketObject]) -> OperationResult<()> {
        let mut buckets = self.buckets.write().await;

        if let Some(missing) = objects
            .iter()
            .find(|object| !buckets.contains_key(object.bucket()))
        {
            return Err(bucket_not_found(missing.bucket()));
        }

        for object in objects {
            if let Some(keys) = buckets.get_mut(object.bucket()) {
                keys.remove(object.key());
            }
        }

        Ok(())
    }

    async fn copy_object(
        &self,
        source: &BucketObject,
        destination: &BucketObject,
    ) -> OperationResult<()> {
        let mut buckets = self.buckets.write().await;

        for bucket in [source.bucket(), destination.bucket()] {
            if !buckets.contains_key(bucket) {
                return Err(bucket_not_found(bucket));
            }
        }

        let source_exists = buckets
            .get(source.bucket())
            .is_some_and(|keys| keys.contains(source.key()));
        if !source_exists {
            return Err(OperationError::KeyNotFound {
                bucket: source.bucket().to_string(),
                key: source.key().to_string(),
            });
        }

        if let Some(keys) = buckets.get_mut(destination.bucket()) {
            keys.insert(destination.key().to_string());
        }

        Ok(())
    }
}
