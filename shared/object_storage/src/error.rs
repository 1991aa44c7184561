//! Error types for object storage operations

use thiserror::Error;

/// Result type for object storage operations
pub type OperationResult<T> = Result<T, OperationError>;

/// Errors that can occur during object storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The bucket does not exist
    #[error("bucket not found: {bucket}")]
    BucketNotFound {
        /// Name of the missing bucket
        bucket: String,
    },

    /// The key does not exist in the bucket
    #[error("key not found: {bucket}{key}")]
    KeyNotFound {
        /// Bucket that was searched
        bucket: String,
        /// Missing key, with its leading slash
        key: String,
    },

    /// Any other backend failure
    #[error("{0}")]
    Unknown(String),
}

impl OperationError {
    /// Whether the error reports a missing bucket or key
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::BucketNotFound { .. } | Self::KeyNotFound { .. })
    }
}
