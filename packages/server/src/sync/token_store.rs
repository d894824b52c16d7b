use async_trait::async_trait;
use chrono::Utc;
use planta::{StoredToken, TokenPair, TokenStore, TokenStoreError};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::Expr};

use crate::entity::sync_token::{self, SINGLETON_ID};

/// [`TokenStore`] backed by the `sync_token` table.
#[derive(Clone)]
pub struct DbTokenStore {
    db: DatabaseConnection,
}

impl DbTokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn backend(e: sea_orm::DbErr) -> TokenStoreError {
    TokenStoreError::Backend(e.to_string())
}

#[async_trait]
impl TokenStore for DbTokenStore {
    async fn load(&self) -> Result<Option<StoredToken>, TokenStoreError> {
        let row = sync_token::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(backend)?;

        Ok(row.map(|row| StoredToken {
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            version: row.version,
        }))
    }

    async fn replace(&self, expected_version: i32, pair: &TokenPair) -> Result<(), TokenStoreError> {
        let result = sync_token::Entity::update_many()
            .col_expr(
                sync_token::Column::AccessToken,
                Expr::value(pair.access_token.clone()),
            )
            .col_expr(
                sync_token::Column::RefreshToken,
                Expr::value(pair.refresh_token.clone()),
            )
            .col_expr(sync_token::Column::ExpiresAt, Expr::value(pair.expires_at))
            .col_expr(
                sync_token::Column::Version,
                Expr::value(expected_version.saturating_add(1)),
            )
            .col_expr(sync_token::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(sync_token::Column::Id.eq(SINGLETON_ID))
            .filter(sync_token::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(TokenStoreError::Conflict { expected_version });
        }
        Ok(())
    }
}
