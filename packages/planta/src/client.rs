use async_trait::async_trait;
use common::retry::{RetryHistory, RetryPolicy};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::PlantaError;
use crate::models::{PlantsPage, RemotePlant};
use crate::token::TokenManager;

/// Source of the full remote plant collection.
#[async_trait]
pub trait PlantSource: Send + Sync {
    async fn fetch_all_plants(&self) -> Result<Vec<RemotePlant>, PlantaError>;
}

/// Authenticated client for the plant API.
#[derive(Clone)]
pub struct PlantaClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenManager,
    retry: RetryPolicy,
}

impl PlantaClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: TokenManager,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            retry,
        }
    }

    /// Walk every page of `/v1/addedPlants`, preserving page and item order.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<RemotePlant>, PlantaError> {
        let access_token = self.tokens.access_token().await?;
        let url = format!("{}/v1/addedPlants", self.base_url);

        let mut plants = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page: PlantsPage = self
                .get_with_retry(&url, &access_token, cursor.as_deref())
                .await?;
            pages += 1;
            debug!(page = pages, items = page.data.len(), "Fetched plant page");
            plants.extend(page.data);

            match page.pagination.next_page {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        info!(pages, plants = plants.len(), "Fetched remote plants");
        Ok(plants)
    }

    /// GET with bounded retry. Rate limits and transport errors share one
    /// attempt counter; any other non-success status fails immediately.
    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
        cursor: Option<&str>,
    ) -> Result<T, PlantaError> {
        let mut history = RetryHistory::new();

        for attempt in 0..self.retry.max_attempts {
            let mut request = self.http.get(url).bearer_auth(access_token);
            if let Some(cursor) = cursor {
                request = request.query(&[("cursor", cursor)]);
            }

            match request.send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let delay = self.retry.delay_for(attempt);
                    history.record("rate limited (HTTP 429)");
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited by plant API, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) if !response.status().is_success() => {
                    return Err(PlantaError::ApiRequest {
                        status: response.status().as_u16(),
                        url: url.to_string(),
                    });
                }
                Ok(response) => {
                    return response
                        .json::<T>()
                        .await
                        .map_err(|e| PlantaError::Decode(e.to_string()));
                }
                Err(e) => {
                    history.record(e.to_string());
                    if self.retry.is_last(attempt) {
                        break;
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Plant API request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(PlantaError::RetriesExhausted {
            attempts: history.len() as u32,
            last_error: history.last_error().unwrap_or("no attempts made").to_string(),
        })
    }
}

#[async_trait]
impl PlantSource for PlantaClient {
    async fn fetch_all_plants(&self) -> Result<Vec<RemotePlant>, PlantaError> {
        self.fetch_all().await
    }
}
