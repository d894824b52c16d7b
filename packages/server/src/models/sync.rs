use serde::Serialize;

use crate::sync::{PlantSyncError, SyncReport};

/// Per-plant failure recorded during a sync run.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SyncErrorItem {
    /// Remote plant id.
    #[schema(example = "5f3a9c1e2b")]
    pub plant_id: String,
    #[schema(example = "Photo download failed after 3 attempts")]
    pub message: String,
}

/// Successful sync response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SyncResponse {
    #[schema(example = true)]
    pub success: bool,
    /// Plants reconciled without error.
    #[schema(example = 54)]
    pub plants_synced: usize,
    /// New photos stored during this run.
    #[schema(example = 3)]
    pub photos_added: usize,
    pub errors: Vec<SyncErrorItem>,
}

impl From<PlantSyncError> for SyncErrorItem {
    fn from(e: PlantSyncError) -> Self {
        Self {
            plant_id: e.plant_id,
            message: e.message,
        }
    }
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            success: true,
            plants_synced: report.plants_synced,
            photos_added: report.photos_added,
            errors: report.errors.into_iter().map(Into::into).collect(),
        }
    }
}
