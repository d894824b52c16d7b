use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use common::{DEFAULT_DISPLAY_ORDER, PhotoSource};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::{photo, plant};

/// Plant card in the gallery list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PlantSummary {
    pub id: Uuid,
    /// Id of the plant in the plant API.
    #[schema(example = "5f3a9c1e2b")]
    pub remote_id: String,
    /// Custom name if set, otherwise the localized name.
    #[schema(example = "Monstera")]
    pub display_name: String,
    pub localized_name: String,
    pub scientific_name: Option<String>,
    pub variety: Option<String>,
    #[schema(example = "Living room")]
    pub location: Option<String>,
    pub photo_count: usize,
    /// Newest remote photo timestamp, if any.
    pub last_updated: Option<DateTime<Utc>>,
    /// First photo of the timeline, i.e. the most recent remote photo when one exists.
    pub thumbnail_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PlantListResponse {
    pub data: Vec<PlantSummary>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub photo_url: String,
    pub storage_path: String,
    pub source: PhotoSource,
    pub remote_last_updated: Option<DateTime<Utc>>,
    pub display_order: Option<i32>,
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<photo::Model> for PhotoResponse {
    fn from(m: photo::Model) -> Self {
        Self {
            id: m.id,
            photo_url: m.photo_url,
            storage_path: m.storage_path,
            source: m.source,
            remote_last_updated: m.remote_last_updated,
            display_order: m.display_order,
            taken_at: m.taken_at,
            created_at: m.created_at,
        }
    }
}

/// One plant with its photo timeline.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PlantDetailResponse {
    pub id: Uuid,
    pub remote_id: String,
    pub display_name: String,
    pub localized_name: String,
    pub custom_name: Option<String>,
    pub scientific_name: Option<String>,
    pub variety: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Remote photos newest first, then historical photos by display order.
    pub photos: Vec<PhotoResponse>,
}

impl PlantSummary {
    /// Build a summary from a plant and its photos in timeline order.
    pub fn new(plant: plant::Model, photos: &[photo::Model]) -> Self {
        Self {
            id: plant.id,
            display_name: plant.display_name().to_string(),
            remote_id: plant.remote_id,
            localized_name: plant.localized_name,
            scientific_name: plant.scientific_name,
            variety: plant.variety,
            location: plant.location,
            photo_count: photos.len(),
            last_updated: photos.iter().filter_map(|p| p.remote_last_updated).max(),
            thumbnail_url: photos.first().map(|p| p.photo_url.clone()),
        }
    }
}

impl PlantDetailResponse {
    pub fn new(plant: plant::Model, photos: Vec<photo::Model>) -> Self {
        Self {
            id: plant.id,
            display_name: plant.display_name().to_string(),
            remote_id: plant.remote_id,
            localized_name: plant.localized_name,
            custom_name: plant.custom_name,
            scientific_name: plant.scientific_name,
            variety: plant.variety,
            location: plant.location,
            created_at: plant.created_at,
            updated_at: plant.updated_at,
            photos: photos.into_iter().map(PhotoResponse::from).collect(),
        }
    }
}

/// Sort key of a photo on a plant timeline.
///
/// Remote photos come first, newest `remote_last_updated` first; historical
/// photos follow by `display_order` (missing sorts as 999). Ties fall back to
/// `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineKey {
    pub source: PhotoSource,
    pub remote_last_updated: Option<DateTime<Utc>>,
    pub display_order: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl TimelineKey {
    fn rank(&self) -> u8 {
        match self.source {
            PhotoSource::Remote => 0,
            PhotoSource::Historical => 1,
        }
    }
}

impl Ord for TimelineKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| match (self.source, other.source) {
                (PhotoSource::Remote, PhotoSource::Remote) => {
                    other.remote_last_updated.cmp(&self.remote_last_updated)
                }
                _ => self
                    .display_order
                    .unwrap_or(DEFAULT_DISPLAY_ORDER)
                    .cmp(&other.display_order.unwrap_or(DEFAULT_DISPLAY_ORDER)),
            })
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

impl PartialOrd for TimelineKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&photo::Model> for TimelineKey {
    fn from(p: &photo::Model) -> Self {
        Self {
            source: p.source,
            remote_last_updated: p.remote_last_updated,
            display_order: p.display_order,
            created_at: p.created_at,
        }
    }
}

pub fn sort_timeline(photos: &mut [photo::Model]) {
    photos.sort_by_key(|p| TimelineKey::from(p));
}
