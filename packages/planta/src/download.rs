use async_trait::async_trait;
use common::retry::{RetryHistory, RetryPolicy};
use tracing::{debug, instrument, warn};

use crate::error::PlantaError;

/// Fetches raw image bytes.
#[async_trait]
pub trait PhotoFetcher: Send + Sync {
    async fn download_photo(&self, url: &str) -> Result<Vec<u8>, PlantaError>;
}

/// Unauthenticated image downloader. Every failure, including any non-2xx
/// status, is retried up to the policy's attempt limit.
#[derive(Clone)]
pub struct PhotoDownloader {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl PhotoDownloader {
    pub fn new(http: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { http, retry }
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self.http.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PhotoFetcher for PhotoDownloader {
    #[instrument(skip(self))]
    async fn download_photo(&self, url: &str) -> Result<Vec<u8>, PlantaError> {
        let mut history = RetryHistory::new();

        for attempt in 0..self.retry.max_attempts {
            match self.attempt(url).await {
                Ok(bytes) => {
                    debug!(bytes = bytes.len(), "Downloaded photo");
                    return Ok(bytes);
                }
                Err(e) => {
                    history.record(e.clone());
                    if self.retry.is_last(attempt) {
                        break;
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Photo download failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(PlantaError::Download {
            url: url.to_string(),
            attempts: history.len() as u32,
            last_error: history.last_error().unwrap_or("no attempts made").to_string(),
        })
    }
}
