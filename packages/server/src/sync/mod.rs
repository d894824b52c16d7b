//! Reconciles the remote plant collection into the local database and photo store.

mod error;
mod lease;
mod token_store;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::PhotoSource;
use common::storage::{ObjectStore, PutOptions};
use planta::{
    PhotoDownloader, PhotoFetcher, PlantSource, PlantaClient, RemoteImage, RemotePlant,
    TokenManager,
};
use sea_orm::*;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entity::{photo, plant};

pub use error::SyncError;
pub use lease::SyncLease;
pub use token_store::DbTokenStore;

/// Lease name guarding sync runs.
pub const SYNC_JOB: &str = "planta-sync";

const REMOTE_CONTENT_TYPE: &str = "image/webp";

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub plants_synced: usize,
    pub photos_added: usize,
    pub errors: Vec<PlantSyncError>,
}

/// A plant that failed to reconcile. Sibling plants are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlantSyncError {
    pub plant_id: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub remote_prefix: String,
    pub lease_ttl: Duration,
}

pub struct SyncService {
    db: DatabaseConnection,
    plants: Arc<dyn PlantSource>,
    photos: Arc<dyn PhotoFetcher>,
    storage: Arc<dyn ObjectStore>,
    settings: SyncSettings,
}

impl SyncService {
    pub fn new(
        db: DatabaseConnection,
        plants: Arc<dyn PlantSource>,
        photos: Arc<dyn PhotoFetcher>,
        storage: Arc<dyn ObjectStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            db,
            plants,
            photos,
            storage,
            settings,
        }
    }

    /// Wire the real plant API client, downloader and token store.
    pub fn from_config(
        db: DatabaseConnection,
        config: &AppConfig,
        storage: Arc<dyn ObjectStore>,
    ) -> Result<Self, SyncError> {
        let http = planta::build_http_client(config.planta.request_timeout())?;
        let retry = config.retry.policy();
        let base_url = config.planta.api_root();

        let tokens = TokenManager::new(
            http.clone(),
            base_url,
            Arc::new(DbTokenStore::new(db.clone())),
        )
        .with_refresh_window(config.planta.refresh_window());
        let client = PlantaClient::new(http.clone(), base_url, tokens, retry);
        let downloader = PhotoDownloader::new(http, retry);

        Ok(Self::new(
            db,
            Arc::new(client),
            Arc::new(downloader),
            storage,
            SyncSettings {
                remote_prefix: config.storage.remote_prefix.clone(),
                lease_ttl: config.sync.lease_ttl(),
            },
        ))
    }

    /// Run one sync pass under the sync lease.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let lease = SyncLease::acquire(&self.db, SYNC_JOB, self.settings.lease_ttl).await?;
        let result = self.sync_all().await;
        if let Err(e) = lease.release().await {
            warn!(error = %e, "Failed to release sync lease; it will expire on its own");
        }
        result
    }

    /// Fetch every remote plant and reconcile each one. Failures while
    /// fetching abort the run; failures on a single plant are recorded.
    #[instrument(skip(self))]
    pub async fn sync_all(&self) -> Result<SyncReport, SyncError> {
        info!("Starting plant sync");
        let remote = self.plants.fetch_all_plants().await?;
        info!(count = remote.len(), "Fetched remote plants");

        let mut report = SyncReport::default();
        for plant in &remote {
            match self.sync_plant(plant).await {
                Ok(added) => {
                    report.plants_synced += 1;
                    if added {
                        report.photos_added += 1;
                    }
                }
                Err(e) => {
                    error!(
                        plant_id = %plant.id,
                        name = plant.display_name(),
                        error = %e,
                        "Failed to sync plant"
                    );
                    report.errors.push(PlantSyncError {
                        plant_id: plant.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            plants_synced = report.plants_synced,
            photos_added = report.photos_added,
            errors = report.errors.len(),
            "Sync complete"
        );
        Ok(report)
    }

    /// Reconcile one remote plant. Returns whether a new photo was stored.
    #[instrument(skip(self, remote), fields(plant_id = %remote.id))]
    pub async fn sync_plant(&self, remote: &RemotePlant) -> Result<bool, SyncError> {
        let local = self.ensure_plant(remote).await?;

        let Some(image) = remote.image.as_ref().filter(|image| !image.url.is_empty()) else {
            debug!("Plant has no image");
            return Ok(false);
        };

        let known = photo::Entity::find()
            .filter(photo::Column::RemoteImageUrl.eq(image.url.as_str()))
            .one(&self.db)
            .await?;
        if known.is_some() {
            debug!("Photo already stored");
            return Ok(false);
        }

        let last_updated = image
            .last_updated_at()
            .map_err(|source| SyncError::PhotoTimestamp {
                value: image.last_updated.clone(),
                source,
            })?;

        let bytes = self.photos.download_photo(&image.url).await?;
        let path = remote_photo_path(&self.settings.remote_prefix, &remote.id, image);
        self.storage
            .put(&path, &bytes, &PutOptions::new(REMOTE_CONTENT_TYPE))
            .await?;
        let url = self.storage.public_url(&path);

        photo::ActiveModel {
            id: Set(Uuid::now_v7()),
            plant_id: Set(local.id),
            storage_path: Set(path.clone()),
            photo_url: Set(url),
            source: Set(PhotoSource::Remote),
            remote_image_url: Set(Some(image.url.clone())),
            remote_last_updated: Set(Some(last_updated)),
            display_order: Set(None),
            taken_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(%path, bytes = bytes.len(), "Added photo");
        Ok(true)
    }

    /// Look up the local plant by remote id, inserting it on first sight.
    /// Existing rows are left untouched.
    async fn ensure_plant(&self, remote: &RemotePlant) -> Result<plant::Model, SyncError> {
        if let Some(existing) = plant::Entity::find()
            .filter(plant::Column::RemoteId.eq(remote.id.as_str()))
            .one(&self.db)
            .await?
        {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = plant::ActiveModel {
            id: Set(Uuid::now_v7()),
            remote_id: Set(remote.id.clone()),
            localized_name: Set(remote.names.localized_name.clone()),
            custom_name: Set(remote.names.custom.clone()),
            scientific_name: Set(remote.names.scientific.clone()),
            variety: Set(remote.names.variety.clone()),
            location: Set(remote.location().map(str::to_string)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(name = remote.display_name(), "Created new plant");
        Ok(model)
    }
}

/// Object path for a remote photo: `{prefix}/{plant id}-{timestamp}.webp`,
/// with colons in the timestamp replaced by dashes.
pub fn remote_photo_path(prefix: &str, remote_id: &str, image: &RemoteImage) -> String {
    format!(
        "{}/{}-{}.webp",
        prefix.trim_matches('/'),
        remote_id,
        image.path_safe_timestamp()
    )
}
