use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mutual-exclusion lease for a named background job.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_lease")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub job_name: String,

    pub holder: String,
    pub acquired_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
