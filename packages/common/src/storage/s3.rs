use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::path::validate_object_path;
use super::traits::{ObjectStore, PutOptions};
use crate::config::S3Config;

/// Object store backed by an S3-compatible bucket.
///
/// `fail_if_exists` is enforced with a HEAD request before the PUT; S3 has no
/// create-only write, so two concurrent writers to one path can still race.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(config: &S3Config, public_base_url: String) -> Result<Self, StorageError> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials).map_err(backend)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            public_base_url,
        })
    }
}

fn backend(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, path: &str, data: &[u8], options: &PutOptions) -> Result<(), StorageError> {
        let path = validate_object_path(path)?;

        if options.fail_if_exists && self.exists(path).await? {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }

        let response = self
            .bucket
            .put_object_with_content_type(path, data, &options.content_type)
            .await
            .map_err(backend)?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Backend(format!(
                "PUT {path} returned HTTP {status}"
            )));
        }

        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let path = validate_object_path(path)?;

        match self.bucket.head_object(path).await {
            Ok((_, 200..=299)) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) => Err(StorageError::Backend(format!(
                "HEAD {path} returned HTTP {status}"
            ))),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    fn public_url(&self, path: &str) -> String {
        super::join_public_url(&self.public_base_url, path)
    }
}
