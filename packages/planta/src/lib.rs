//! Client for the Planta plant-tracking API.
//!
//! - [`TokenManager`] keeps a valid access token, rotating the refresh token pair
//!   through a [`TokenStore`].
//! - [`PlantaClient`] walks the cursor-paginated plant collection.
//! - [`PhotoDownloader`] fetches image bytes with bounded retry.

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod models;
pub mod token;

#[cfg(test)]
mod test_support;

pub use client::{PlantSource, PlantaClient};
pub use config::PlantaConfig;
pub use download::{PhotoDownloader, PhotoFetcher};
pub use error::PlantaError;
pub use models::{RemoteImage, RemotePlant, RemotePlantNames, RemoteSite};
pub use token::{RefreshOutcome, StoredToken, TokenManager, TokenPair, TokenStore, TokenStoreError};

use std::time::Duration;

/// Build the shared HTTP client used for API calls and photo downloads.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, PlantaError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("leafline/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(PlantaError::Http)
}
