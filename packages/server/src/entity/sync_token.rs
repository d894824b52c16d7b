use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Id of the only row in `sync_token`.
pub const SINGLETON_ID: i32 = 1;

/// Current plant API credential pair. Single row; `version` guards concurrent refreshes.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_token")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub access_token: String,
    #[sea_orm(column_type = "Text")]
    pub refresh_token: String,

    pub expires_at: DateTimeUtc,

    #[sea_orm(default_value = 0)]
    pub version: i32,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
