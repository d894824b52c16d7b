use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://public.planta-api.com";

/// Plant API connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct PlantaConfig {
    /// API root without the `/v1` suffix. Default: "https://public.planta-api.com".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Refresh the access token when it expires within this many seconds. Default: 3600.
    #[serde(default = "default_refresh_window_secs")]
    pub refresh_window_secs: u64,
    /// Per-request timeout in seconds. Default: 30.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_refresh_window_secs() -> u64 {
    3600
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for PlantaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            refresh_window_secs: default_refresh_window_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl PlantaConfig {
    pub fn refresh_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_window_secs as i64)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL with any trailing slash removed.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
