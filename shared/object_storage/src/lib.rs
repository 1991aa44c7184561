//! Object storage capability for the presign gateway
//!
//! This crate defines the operations the gateway performs against an
//! S3-compatible backend, the error taxonomy those operations report, and the
//! production implementation backed by `aws-sdk-s3`.

mod error;
mod object;
pub mod s3;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;

pub use error::{OperationError, OperationResult};
pub use object::BucketObject;

/// Operations the gateway needs from an object store
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Creates a presigned URL allowing the bearer to upload `object`
    ///
    /// # Errors
    ///
    /// Returns `OperationError::BucketNotFound` when the bucket does not exist
    /// and `OperationError::Unknown` for any other backend failure
    async fn create_upload_url(&self, object: &BucketObject, ttl: Duration)
        -> OperationResult<String>;

    /// Creates a presigned URL allowing the bearer to download `object`
    ///
    /// # Errors
    ///
    /// Returns `OperationError::BucketNotFound` or `OperationError::KeyNotFound`
    /// when the target is known to be missing, `OperationError::Unknown` otherwise
    async fn create_download_url(
        &self,
        object: &BucketObject,
        ttl: Duration,
    ) -> OperationResult<String>;

    /// Deletes `object`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an `OperationError` if the backend rejects the request
    async fn delete_object(&self, object: &BucketObject) -> OperationResult<()>;

    /// Deletes every object in `objects` as one logical operation
    ///
    /// # Errors
    ///
    /// Returns an `OperationError` if any of the objects could not be deleted
    async fn batch_delete(&self, objects: &[BucketObject]) -> OperationResult<()>;

    /// Copies `source` to `destination` on the server side
    ///
    /// # Errors
    ///
    /// Returns `OperationError::BucketNotFound` when either bucket is missing,
    /// `OperationError::KeyNotFound` when the source key is missing, and
    /// `OperationError::Unknown` for any other backend failure
    async fn copy_object(
        &self,
        source: &BucketObject,
        destination: &BucketObject,
    ) -> OperationResult<()>;
}
