use common::PhotoSource;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "photo")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(indexed)]
    pub plant_id: Uuid,
    #[sea_orm(belongs_to, from = "plant_id", to = "id")]
    pub plant: HasOne<super::plant::Entity>,

    /// Object path inside the photo store.
    pub storage_path: String,
    pub photo_url: String,

    #[sea_orm(indexed)]
    pub source: PhotoSource,

    /// Dedup key for remote photos. `None` for historical ones.
    #[sea_orm(indexed)]
    pub remote_image_url: Option<String>,
    pub remote_last_updated: Option<DateTimeUtc>,

    /// Sort key for historical photos, parsed from the file name.
    pub display_order: Option<i32>,
    pub taken_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
