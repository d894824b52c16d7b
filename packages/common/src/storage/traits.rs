use async_trait::async_trait;

use super::error::StorageError;

/// Options for [`ObjectStore::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: String,
    /// Fail with [`StorageError::AlreadyExists`] instead of replacing an existing object.
    pub fail_if_exists: bool,
}

impl PutOptions {
    /// Create-only upload with the given content type.
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            fail_if_exists: true,
        }
    }
}

/// Path-addressed object storage with public retrieval URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes at `path`.
    async fn put(&self, path: &str, data: &[u8], options: &PutOptions) -> Result<(), StorageError>;

    /// Check whether an object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Public URL under which the object at `path` is served.
    fn public_url(&self, path: &str) -> String;
}
