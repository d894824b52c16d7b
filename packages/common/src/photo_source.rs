#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a photo came from.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSource {
    /// Ingested from the plant-tracking API; keyed by its remote image URL.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "remote"))]
    Remote,
    /// Backfilled from a local archive; ordered by `display_order`.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "historical"))]
    Historical,
}

impl PhotoSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Historical => "historical",
        }
    }
}

impl fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(Self::Remote),
            "historical" => Ok(Self::Historical),
            other => Err(format!("unknown photo source: {other}")),
        }
    }
}
