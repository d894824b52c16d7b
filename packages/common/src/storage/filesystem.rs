use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StorageError;
use super::path::validate_object_path;
use super::traits::{ObjectStore, PutOptions};

/// Filesystem-backed object store.
///
/// Objects live at `{root}/{path}`; public URLs are `{public_base_url}/{path}`.
/// Content types are not persisted, the serving layer derives them from the extension.
pub struct FilesystemObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemObjectStore {
    /// Create a new filesystem object store, creating `root` if needed.
    pub async fn new(root: PathBuf, public_base_url: String) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url,
        })
    }

    /// Compute the filesystem path for a validated object path.
    fn object_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let path = validate_object_path(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, path: &str, data: &[u8], options: &PutOptions) -> Result<(), StorageError> {
        let object_path = self.object_path(path)?;

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if options.fail_if_exists {
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&object_path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    return Err(StorageError::AlreadyExists(path.to_string()));
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = write_all(&mut file, data).await {
                drop(file);
                let _ = fs::remove_file(&object_path).await;
                return Err(e.into());
            }
            return Ok(());
        }

        fs::write(&object_path, data).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let object_path = self.object_path(path)?;
        Ok(fs::try_exists(&object_path).await?)
    }

    fn public_url(&self, path: &str) -> String {
        super::join_public_url(&self.public_base_url, path)
    }
}

async fn write_all(file: &mut fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}
