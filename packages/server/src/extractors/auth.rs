use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::SyncFailure;
use crate::state::AppState;

/// Caller of the sync endpoint, authenticated by the shared sync API key in
/// `Authorization: Bearer <key>`.
///
/// Add this as a handler parameter; requests with a missing or wrong key are
/// rejected with 401 before the handler body runs.
pub struct SyncCaller;

impl FromRequestParts<AppState> for SyncCaller {
    type Rejection = SyncFailure;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.config.auth.sync_api_key.as_str();

        let presented = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match presented {
            Some(key) if !expected.is_empty() && key == expected => Ok(SyncCaller),
            _ => {
                let forwarded = parts
                    .headers
                    .get("x-forwarded-for")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::warn!(forwarded_for = forwarded, "Unauthorized sync attempt");
                Err(SyncFailure::unauthorized())
            }
        }
    }
}
