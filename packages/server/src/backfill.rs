//! Import of archived plant photos kept in local folders, one folder per plant.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use common::storage::{ObjectStore, PutOptions, StorageError};
use common::{PhotoSource, extract_display_order, is_image_file};
use sea_orm::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entity::{photo, plant};

/// Files above this size are uploaded but flagged in the report.
pub const LARGE_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

/// Folder name to remote plant id.
pub type FolderMapping = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("Failed to read mapping file {path}: {source}")]
    MappingRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mapping file {path}: {source}")]
    MappingParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Folder not found: {0}")]
    FolderMissing(PathBuf),

    #[error("No plant with remote id {0}; run a sync first")]
    PlantNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// Directory holding one subfolder per plant.
    pub photos_root: PathBuf,
    pub historical_prefix: String,
    /// List what would be uploaded without writing anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillIssue {
    pub folder: String,
    /// `None` when the whole folder failed.
    pub file: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub folders_total: usize,
    pub folders_processed: usize,
    pub photos_uploaded: usize,
    /// Photos already present in storage.
    pub skipped: usize,
    /// Object paths a dry run would upload.
    pub planned: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<BackfillIssue>,
}

pub async fn load_mapping(path: &Path) -> Result<FolderMapping, BackfillError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BackfillError::MappingRead {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| BackfillError::MappingParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Object path of a historical photo.
pub fn historical_photo_path(prefix: &str, folder: &str, file: &str) -> String {
    format!("{}/{folder}/{file}", prefix.trim_matches('/'))
}

/// Upload every mapped folder. Failures are recorded per folder or per file
/// and never stop the remaining work.
pub async fn run_backfill(
    db: &DatabaseConnection,
    store: &dyn ObjectStore,
    mapping: &FolderMapping,
    options: &BackfillOptions,
) -> BackfillReport {
    let mut report = BackfillReport {
        folders_total: mapping.len(),
        ..Default::default()
    };

    for (folder, remote_id) in mapping {
        match backfill_folder(db, store, folder, remote_id, options, &mut report).await {
            Ok(true) => report.folders_processed += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(folder, error = %e, "Failed to process folder");
                report.errors.push(BackfillIssue {
                    folder: folder.clone(),
                    file: None,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        folders = report.folders_processed,
        uploaded = report.photos_uploaded,
        skipped = report.skipped,
        warnings = report.warnings.len(),
        errors = report.errors.len(),
        dry_run = options.dry_run,
        "Backfill complete"
    );
    report
}

/// Returns `Ok(false)` for a folder without images.
async fn backfill_folder(
    db: &DatabaseConnection,
    store: &dyn ObjectStore,
    folder: &str,
    remote_id: &str,
    options: &BackfillOptions,
    report: &mut BackfillReport,
) -> Result<bool, BackfillError> {
    let dir = options.photos_root.join(folder);
    if !tokio::fs::try_exists(&dir).await? {
        return Err(BackfillError::FolderMissing(dir));
    }

    let plant = plant::Entity::find()
        .filter(plant::Column::RemoteId.eq(remote_id))
        .one(db)
        .await?
        .ok_or_else(|| BackfillError::PlantNotFound(remote_id.to_string()))?;

    let files = list_images(&dir).await?;
    info!(folder, plant_id = %plant.id, photos = files.len(), "Processing folder");
    if files.is_empty() {
        warn!(folder, "No photos found, skipping");
        return Ok(false);
    }

    for file in &files {
        match backfill_file(db, store, folder, file, &dir, plant.id, options, report).await {
            Ok(()) => {}
            Err(e) => {
                warn!(folder, file, error = %e, "Failed to upload photo");
                report.errors.push(BackfillIssue {
                    folder: folder.to_string(),
                    file: Some(file.clone()),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(true)
}

#[allow(clippy::too_many_arguments)]
async fn backfill_file(
    db: &DatabaseConnection,
    store: &dyn ObjectStore,
    folder: &str,
    file: &str,
    dir: &Path,
    plant_id: Uuid,
    options: &BackfillOptions,
    report: &mut BackfillReport,
) -> Result<(), BackfillError> {
    let local = dir.join(file);
    let storage_path = historical_photo_path(&options.historical_prefix, folder, file);
    let display_order = extract_display_order(file);

    let size = tokio::fs::metadata(&local).await?.len();
    if size > LARGE_PHOTO_BYTES {
        let warning = format!(
            "{folder}/{file}: File is {:.2}MB (exceeds 5MB)",
            size as f64 / (1024.0 * 1024.0)
        );
        warn!("{}", warning);
        report.warnings.push(warning);
    }

    if options.dry_run {
        if store.exists(&storage_path).await? {
            report.skipped += 1;
        } else {
            info!(%storage_path, display_order, "Would upload");
            report.planned.push(storage_path);
        }
        return Ok(());
    }

    let bytes = tokio::fs::read(&local).await?;
    let content_type = mime_guess::from_path(&local).first_or_octet_stream();
    match store
        .put(&storage_path, &bytes, &PutOptions::new(content_type.essence_str()))
        .await
    {
        Ok(()) => {}
        Err(StorageError::AlreadyExists(_)) => {
            info!(%storage_path, "Already uploaded, skipping");
            report.skipped += 1;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    photo::ActiveModel {
        id: Set(Uuid::now_v7()),
        plant_id: Set(plant_id),
        storage_path: Set(storage_path.clone()),
        photo_url: Set(store.public_url(&storage_path)),
        source: Set(PhotoSource::Historical),
        remote_image_url: Set(None),
        remote_last_updated: Set(None),
        display_order: Set(Some(display_order)),
        taken_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(%storage_path, display_order, "Uploaded photo");
    report.photos_uploaded += 1;
    Ok(())
}

/// Image file names in `dir`, sorted by name.
async fn list_images(dir: &Path) -> Result<Vec<String>, std::io::Error> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && is_image_file(name)
        {
            files.push(name.to_string());
        }
    }
    files.sort();
    Ok(files)
}
