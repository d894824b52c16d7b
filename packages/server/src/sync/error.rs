use chrono::{DateTime, Utc};
use common::storage::StorageError;
use planta::PlantaError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] PlantaError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid image timestamp {value:?}: {source}")]
    PhotoTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("A sync is already running (held by {holder} until {expires_at})")]
    AlreadyRunning {
        holder: String,
        expires_at: DateTime<Utc>,
    },
}
