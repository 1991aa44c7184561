//! S3-backed implementation of [`ObjectStorage`]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    presigning::PresigningConfig,
    types::{Delete, ObjectIdentifier},
    Client as S3Client,
};
use futures::future::try_join_all;

use crate::{BucketObject, ObjectStorage, OperationError, OperationResult};

/// Maximum number of keys S3 accepts in a single `DeleteObjects` call
const MAX_KEYS_PER_DELETE: usize = 1000;

const NO_SUCH_BUCKET: &str = "NoSuchBucket";
const NO_SUCH_KEY: &str = "NoSuchKey";

/// Object storage client for S3 operations
#[derive(Debug, Clone)]
pub struct S3ObjectStorage {
    s3_client: Arc<S3Client>,
}

impl S3ObjectStorage {
    /// Creates a new S3 object storage
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }

    fn presigning_config(ttl: Duration) -> OperationResult<PresigningConfig> {
        PresigningConfig::expires_in(ttl).map_err(|e| {
            OperationError::Unknown(format!(
                "Failed to create presigning config for {}s: {e}",
                ttl.as_secs()
            ))
        })
    }

    async fn delete_chunk(&self, bucket: &str, chunk: &[&BucketObject]) -> OperationResult<()> {
        let identifiers = chunk
            .iter()
            .map(|object| {
                ObjectIdentifier::builder()
                    .key(object.storage_key())
                    .build()
                    .map_err(|e| OperationError::Unknown(format!("Invalid object identifier: {e}")))
            })
            .collect::<OperationResult<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|e| OperationError::Unknown(format!("Invalid delete request: {e}")))?;

        let output = self
            .s3_client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, || not_found_bucket(bucket), || None))?;

        let failures = output.errors();
        if failures.is_empty() {
            return Ok(());
        }

        let summary = failures
            .iter()
            .map(|failure| {
                format!(
                    "{}: {}",
                    failure.key().unwrap_or("<unknown key>"),
                    failure.code().unwrap_or("<unknown code>")
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        tracing::warn!(
            bucket,
            failed = failures.len(),
            "Batch delete partially failed: {summary}"
        );

        Err(OperationError::Unknown(format!(
            "Failed to delete {} of {} objects in {bucket}: {summary}",
            failures.len(),
            chunk.len()
        )))
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn create_upload_url(
        &self,
        object: &BucketObject,
        ttl: Duration,
    ) -> OperationResult<String> {
        let config = Self::presigning_config(ttl)?;

        let presigned = self
            .s3_client
            .put_object()
            .bucket(object.bucket())
            .key(object.storage_key())
            .presigned(config)
            .await
            .map_err(|e| map_sdk_error(e, || not_found_bucket(object.bucket()), || None))?;

        Ok(presigned.uri().to_string())
    }

    async fn create_download_url(
        &self,
        object: &BucketObject,
        ttl: Duration,
    ) -> OperationResult<String> {
        let config = Self::presigning_config(ttl)?;

        let presigned = self
            .s3_client
            .get_object()
            .bucket(object.bucket())
            .key(object.storage_key())
            .presigned(config)
            .await
            .map_err(|e| {
                map_sdk_error(
                    e,
                    || not_found_bucket(object.bucket()),
                    || Some(not_found_key(object)),
                )
            })?;

        Ok(presigned.uri().to_string())
    }

    async fn delete_object(&self, object: &BucketObject) -> OperationResult<()> {
        tracing::debug!("S3 delete_object: {object}");

        // S3 answers 204 for keys that do not exist
        self.s3_client
            .delete_object()
            .bucket(object.bucket())
            .key(object.storage_key())
            .send()
            .await
            .map_err(|e| map_sdk_error(e, || not_found_bucket(object.bucket()), || None))?;

        Ok(())
    }

    async fn batch_delete(&self, objects: &[BucketObject]) -> OperationResult<()> {
        let mut by_bucket: BTreeMap<&str, Vec<&BucketObject>> = BTreeMap::new();
        for object in objects {
            by_bucket.entry(object.bucket()).or_default().push(object);
        }

        let deletions = by_bucket.iter().flat_map(|(bucket, objects)| {
            objects
                .chunks(MAX_KEYS_PER_DELETE)
                .map(move |chunk| self.delete_chunk(bucket, chunk))
        });

        try_join_all(deletions).await?;

        tracing::debug!("S3 batch delete removed {} objects", objects.len());
        Ok(())
    }

    async fn copy_object(
        &self,
        source: &BucketObject,
        destination: &BucketObject,
    ) -> OperationResult<()> {
        tracing::debug!("S3 copy_object: {source} -> {destination}");

        self.s3_client
            .copy_object()
            .copy_source(source.copy_source())
            .bucket(destination.bucket())
            .key(destination.storage_key())
            .send()
            .await
            .map_err(|e| {
                map_sdk_error(
                    e,
                    || {
                        if source.bucket() == destination.bucket() {
                            not_found_bucket(source.bucket())
                        } else {
                            not_found_bucket(&format!(
                                "{} or {}",
                                source.bucket(),
                                destination.bucket()
                            ))
                        }
                    },
                    || Some(not_found_key(source)),
                )
            })?;

        Ok(())
    }
}

fn not_found_bucket(bucket: &str) -> OperationError {
    OperationError::BucketNotFound {
        bucket: bucket.to_string(),
    }
}

fn not_found_key(object: &BucketObject) -> OperationError {
    OperationError::KeyNotFound {
        bucket: object.bucket().to_string(),
        key: object.key().to_string(),
    }
}

/// Maps an SDK error to an [`OperationError`] using the S3 error code
///
/// `missing_key` returns `None` for operations where `NoSuchKey` cannot
/// refer to a caller-supplied key.
fn map_sdk_error<E, R>(
    err: SdkError<E, R>,
    missing_bucket: impl FnOnce() -> OperationError,
    missing_key: impl FnOnce() -> Option<OperationError>,
) -> OperationError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some(NO_SUCH_BUCKET) => missing_bucket(),
        Some(NO_SUCH_KEY) => missing_key()
            .unwrap_or_else(|| OperationError::Unknown(DisplayErrorContext(&err).to_string())),
        _ => OperationError::Unknown(DisplayErrorContext(&err).to_string()),
    }
}
