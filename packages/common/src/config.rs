use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::retry::RetryPolicy;

/// Retry settings shared by the plant API client and the photo downloader.
#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Maximum attempts per request, including the first. Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff base in milliseconds. Default: 1000.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    S3,
}

/// S3-compatible bucket settings (Supabase Storage, MinIO, AWS).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct S3Config {
    pub bucket: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// Custom endpoint. Defaults to the AWS endpoint for `region`.
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    #[serde(default)]
    pub path_style: bool,
}

fn default_s3_region() -> String {
    "us-east-1".into()
}

/// Object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend. Default: "./data/photos".
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Prefix joined with an object path to build its public URL.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Path prefix for photos ingested from the plant API. Default: "planta".
    #[serde(default = "default_remote_prefix")]
    pub remote_prefix: String,
    /// Path prefix for backfilled historical photos. Default: "historical".
    #[serde(default = "default_historical_prefix")]
    pub historical_prefix: String,
    #[serde(default)]
    pub s3: Option<S3Config>,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data/photos")
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:3000/photos".into()
}
fn default_remote_prefix() -> String {
    "planta".into()
}
fn default_historical_prefix() -> String {
    "historical".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            public_base_url: default_public_base_url(),
            remote_prefix: default_remote_prefix(),
            historical_prefix: default_historical_prefix(),
            s3: None,
        }
    }
}
