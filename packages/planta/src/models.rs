use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A plant as returned by `GET /v1/addedPlants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePlant {
    pub id: String,
    pub names: RemotePlantNames,
    #[serde(default)]
    pub site: Option<RemoteSite>,
    /// `null` when the plant has no photo, which is common.
    #[serde(default)]
    pub image: Option<RemoteImage>,
}

impl RemotePlant {
    /// Custom name when set, otherwise the localized name.
    pub fn display_name(&self) -> &str {
        self.names
            .custom
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.names.localized_name)
    }

    pub fn location(&self) -> Option<&str> {
        self.site.as_ref().and_then(|site| site.name.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePlantNames {
    pub localized_name: String,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub custom: Option<String>,
    #[serde(default)]
    pub scientific: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSite {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteImage {
    /// Stable image URL; the dedup key for ingested photos.
    pub url: String,
    /// ISO-8601 timestamp, kept verbatim because it becomes part of the storage path.
    pub last_updated: String,
}

impl RemoteImage {
    pub fn last_updated_at(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.last_updated).map(|dt| dt.with_timezone(&Utc))
    }

    /// `last_updated` with colons replaced so it is safe inside a path segment.
    pub fn path_safe_timestamp(&self) -> String {
        self.last_updated.replace(':', "-")
    }
}

/// One page of `GET /v1/addedPlants`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantsPage {
    pub data: Vec<RemotePlant>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Opaque cursor for the next page; `None` on the last page.
    #[serde(default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthEnvelope {
    pub data: AuthTokens,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}
