mod error;
mod path;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use path::validate_object_path;
pub use traits::{ObjectStore, PutOptions};

use crate::config::{StorageBackend, StorageConfig};

/// Build the configured object store backend.
pub async fn build_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let store = filesystem::FilesystemObjectStore::new(
                config.root.clone(),
                config.public_base_url.clone(),
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StorageError::Backend("storage.backend is \"s3\" but [storage.s3] is missing".into())
            })?;
            let store = s3::S3ObjectStore::new(s3_config, config.public_base_url.clone())?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Backend(
            "S3 storage requires the `object-storage` feature".into(),
        )),
    }
}

/// Join a public base URL and an object path, escaping characters that are not URL-safe.
pub fn join_public_url(base: &str, path: &str) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in path.split('/') {
        url.push('/');
        for byte in segment.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
                url.push(byte as char);
            } else {
                url.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    url
}
