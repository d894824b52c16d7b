use thiserror::Error;

use crate::token::TokenStoreError;

/// Errors raised while talking to the plant API.
#[derive(Debug, Error)]
pub enum PlantaError {
    /// No sync token has been bootstrapped. Not retryable.
    #[error("Sync token is not configured: {0}")]
    Configuration(String),

    /// The refresh token was rejected. A human has to bootstrap a new token pair.
    #[error(
        "Refresh token is invalid or expired. Bootstrap a new token pair with `leafline bootstrap-token`."
    )]
    AuthExpired,

    #[error("Token refresh failed: {message}")]
    RefreshFailed { status: Option<u16>, message: String },

    /// Non-2xx, non-429 response from the API.
    #[error("API request failed: HTTP {status} for {url}")]
    ApiRequest { status: u16, url: String },

    #[error("Request failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Photo download failed after {attempts} attempts ({url}): {last_error}")]
    Download {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Invalid API response: {0}")]
    Decode(String),

    #[error("Failed to read sync token: {0}")]
    TokenStore(#[from] TokenStoreError),

    #[error(transparent)]
    Http(reqwest::Error),
}

impl PlantaError {
    /// Whether a human has to act before a sync can succeed.
    pub fn requires_bootstrap(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::AuthExpired)
    }
}
