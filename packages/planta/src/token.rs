use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::error::PlantaError;
use crate::models::{AuthEnvelope, RefreshTokenRequest};

/// The persisted credential pair plus its optimistic-concurrency version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub version: i32,
}

/// A freshly rotated credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Someone else replaced the token since it was read.
    #[error("Sync token was modified concurrently (expected version {expected_version})")]
    Conflict { expected_version: i32 },

    #[error("Token store error: {0}")]
    Backend(String),
}

/// Durable home of the singleton sync token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` if it was never bootstrapped.
    async fn load(&self) -> Result<Option<StoredToken>, TokenStoreError>;

    /// Replace all three token fields at once, only if the stored version is
    /// still `expected_version`. Bumps the version on success.
    async fn replace(&self, expected_version: i32, pair: &TokenPair)
    -> Result<(), TokenStoreError>;
}

/// Result of a successful refresh call.
///
/// `persisted == false` means the new pair only lives in memory: the access
/// token is usable for this run but the next run will have to refresh again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub persisted: bool,
}

/// Hands out a valid access token, rotating the pair ahead of expiry.
#[derive(Clone)]
pub struct TokenManager {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    refresh_window: Duration,
}

impl TokenManager {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            refresh_window: Duration::hours(1),
        }
    }

    pub fn with_refresh_window(mut self, window: Duration) -> Self {
        self.refresh_window = window;
        self
    }

    /// Return an access token valid for at least the refresh window.
    #[instrument(skip(self))]
    pub async fn access_token(&self) -> Result<String, PlantaError> {
        let stored = self.store.load().await?.ok_or_else(|| {
            PlantaError::Configuration(
                "no sync token found; bootstrap one with `leafline bootstrap-token`".into(),
            )
        })?;

        if !needs_refresh(stored.expires_at, Utc::now(), self.refresh_window) {
            debug!(expires_at = %stored.expires_at, "Access token still valid");
            return Ok(stored.access_token);
        }

        info!(expires_at = %stored.expires_at, "Access token expiring, refreshing");
        let outcome = self.refresh(&stored).await?;
        if !outcome.persisted {
            warn!("Using refreshed access token from memory; rotated pair was not saved");
        }
        Ok(outcome.access_token)
    }

    /// Exchange the stored refresh token for a new pair and try to persist it.
    pub async fn refresh(&self, current: &StoredToken) -> Result<RefreshOutcome, PlantaError> {
        let url = format!("{}/v1/auth/refreshToken", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&RefreshTokenRequest {
                refresh_token: &current.refresh_token,
            })
            .send()
            .await
            .map_err(|e| PlantaError::RefreshFailed {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(PlantaError::AuthExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlantaError::RefreshFailed {
                status: Some(status.as_u16()),
                message: format!("HTTP {status}: {body}"),
            });
        }

        let envelope: AuthEnvelope =
            response
                .json()
                .await
                .map_err(|e| PlantaError::RefreshFailed {
                    status: Some(status.as_u16()),
                    message: format!("invalid refresh response: {e}"),
                })?;

        let pair = TokenPair {
            access_token: envelope.data.access_token,
            refresh_token: envelope.data.refresh_token,
            expires_at: envelope.data.expires_at,
        };

        let persisted = match self.store.replace(current.version, &pair).await {
            Ok(()) => {
                info!(expires_at = %pair.expires_at, "Rotated sync token saved");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to persist rotated sync token");
                false
            }
        };

        Ok(RefreshOutcome {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.expires_at,
            persisted,
        })
    }
}

/// A token needs refreshing when it expires before `now + window`.
pub fn needs_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    expires_at < now + window
}
