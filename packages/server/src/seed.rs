use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;

use crate::entity::sync_token::{self, SINGLETON_ID};

/// Operator-supplied credentials for the plant API.
#[derive(Debug, Clone)]
pub struct BootstrapToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Write the sync token singleton, replacing any existing pair and resetting
/// its version.
pub async fn seed_sync_token<C: ConnectionTrait>(
    db: &C,
    token: &BootstrapToken,
) -> Result<(), DbErr> {
    let model = sync_token::ActiveModel {
        id: Set(SINGLETON_ID),
        access_token: Set(token.access_token.clone()),
        refresh_token: Set(token.refresh_token.clone()),
        expires_at: Set(token.expires_at),
        version: Set(0),
        updated_at: Set(Utc::now()),
    };

    sync_token::Entity::insert(model)
        .on_conflict(
            OnConflict::column(sync_token::Column::Id)
                .update_columns([
                    sync_token::Column::AccessToken,
                    sync_token::Column::RefreshToken,
                    sync_token::Column::ExpiresAt,
                    sync_token::Column::Version,
                    sync_token::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!(expires_at = %token.expires_at, "Bootstrapped sync token");
    Ok(())
}
