use std::time::Duration;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr, sea_query::Expr,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::SyncError;
use crate::entity::sync_lease;

/// A held row in `sync_lease`. Only one holder per job name at a time.
///
/// Dropping a lease that was not released (for example when the run future
/// is cancelled) deletes the row from a spawned task.
#[derive(Debug)]
pub struct SyncLease {
    db: DatabaseConnection,
    job_name: String,
    holder: String,
    released: bool,
}

impl SyncLease {
    /// Take the lease for `job_name`, or fail with [`SyncError::AlreadyRunning`]
    /// if another holder has an unexpired lease.
    pub async fn acquire(
        db: &DatabaseConnection,
        job_name: &str,
        ttl: Duration,
    ) -> Result<Self, SyncError> {
        let holder = Uuid::now_v7().to_string();
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);

        let lease = sync_lease::ActiveModel {
            job_name: Set(job_name.to_string()),
            holder: Set(holder.clone()),
            acquired_at: Set(now),
            expires_at: Set(expires_at),
        };

        match lease.insert(db).await {
            Ok(_) => {
                info!(job = job_name, %holder, "Acquired sync lease");
                return Ok(Self::held(db, job_name, holder));
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {}
            Err(e) => return Err(e.into()),
        }

        let existing = sync_lease::Entity::find_by_id(job_name.to_string())
            .one(db)
            .await?
            .ok_or_else(|| DbErr::Custom("sync lease vanished during acquire".into()))?;

        if existing.expires_at > now {
            return Err(SyncError::AlreadyRunning {
                holder: existing.holder,
                expires_at: existing.expires_at,
            });
        }

        // Take over the stale lease, unless someone else got there first.
        let taken = sync_lease::Entity::update_many()
            .col_expr(sync_lease::Column::Holder, Expr::value(holder.clone()))
            .col_expr(sync_lease::Column::AcquiredAt, Expr::value(now))
            .col_expr(sync_lease::Column::ExpiresAt, Expr::value(expires_at))
            .filter(sync_lease::Column::JobName.eq(job_name))
            .filter(sync_lease::Column::Holder.eq(existing.holder.clone()))
            .exec(db)
            .await?;

        if taken.rows_affected == 0 {
            let current = sync_lease::Entity::find_by_id(job_name.to_string())
                .one(db)
                .await?;
            return Err(match current {
                Some(lease) => SyncError::AlreadyRunning {
                    holder: lease.holder,
                    expires_at: lease.expires_at,
                },
                None => DbErr::Custom("sync lease vanished during takeover".into()).into(),
            });
        }

        warn!(
            job = job_name,
            stale_holder = %existing.holder,
            stale_expiry = %existing.expires_at,
            "Took over expired sync lease"
        );
        Ok(Self::held(db, job_name, holder))
    }

    fn held(db: &DatabaseConnection, job_name: &str, holder: String) -> Self {
        Self {
            db: db.clone(),
            job_name: job_name.to_string(),
            holder,
            released: false,
        }
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Delete the lease row if this holder still owns it.
    pub async fn release(mut self) -> Result<(), DbErr> {
        self.released = true;
        delete_lease(&self.db, &self.job_name, &self.holder).await
    }
}

impl Drop for SyncLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(job = %self.job_name, "Sync lease dropped outside a runtime; it will expire on its own");
            return;
        };

        warn!(job = %self.job_name, holder = %self.holder, "Sync lease dropped without release");
        let db = self.db.clone();
        let job_name = std::mem::take(&mut self.job_name);
        let holder = std::mem::take(&mut self.holder);
        runtime.spawn(async move {
            if let Err(e) = delete_lease(&db, &job_name, &holder).await {
                error!(job = %job_name, error = %e, "Failed to release abandoned sync lease");
            }
        });
    }
}

async fn delete_lease(db: &DatabaseConnection, job_name: &str, holder: &str) -> Result<(), DbErr> {
    let result = sync_lease::Entity::delete_many()
        .filter(sync_lease::Column::JobName.eq(job_name))
        .filter(sync_lease::Column::Holder.eq(holder))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        warn!(job = job_name, holder, "Sync lease was already gone");
    }
    Ok(())
}
