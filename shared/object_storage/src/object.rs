use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in an `x-amz-copy-source` value. Path separators and
/// RFC 3986 unreserved marks stay literal.
const COPY_SOURCE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Location of an object: a bucket and a key inside it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketObject {
    bucket: String,
    key: String,
}

impl BucketObject {
    /// Creates a new bucket object, prefixing the key with `/` if needed
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        let key = if key.starts_with('/') {
            key
        } else {
            format!("/{key}")
        };

        Self {
            bucket: bucket.into(),
            key,
        }
    }

    /// Bucket name
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key, always starting with `/`
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key as stored by S3, without the leading `/`
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key[1..]
    }

    /// Percent-encoded `bucket/key` for a server-side copy
    #[must_use]
    pub fn copy_source(&self) -> String {
        utf8_percent_encode(&format!("{}{}", self.bucket, self.key), COPY_SOURCE).to_string()
    }
}

impl fmt::Display for BucketObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_normalized_with_leading_slash() {
        let object = BucketObject::new("media", "folder/file.txt");
        assert_eq!(object.key(), "/folder/file.txt");
        assert_eq!(object.storage_key(), "folder/file.txt");

        let object = BucketObject::new("media", "/folder/file.txt");
        assert_eq!(object.key(), "/folder/file.txt");
        assert_eq!(object, BucketObject::new("media", "folder/file.txt"));
    }

    #[test]
    fn test_objects_differing_by_bucket_are_not_equal() {
        assert_ne!(
            BucketObject::new("a", "/file"),
            BucketObject::new("b", "/file")
        );
    }

    #[test]
    fn test_copy_source_is_percent_encoded() {
        let object = BucketObject::new("media", "/my folder/ré sumé+v1.pdf");
        assert_eq!(
            object.copy_source(),
            "media/my%20folder/r%C3%A9%20sum%C3%A9%2Bv1.pdf"
        );
    }

    #[test]
    fn test_display_joins_bucket_and_key() {
        assert_eq!(
            BucketObject::new("media", "/a/b").to_string(),
            "media/a/b"
        );
    }
}
