use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A houseplant, keyed externally by its plant API id.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub remote_id: String,

    pub localized_name: String,
    pub custom_name: Option<String>,
    pub scientific_name: Option<String>,
    pub variety: Option<String>,
    pub location: Option<String>,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub photos: HasMany<super::photo::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn display_name(&self) -> &str {
        self.custom_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.localized_name)
    }
}

impl ActiveModelBehavior for ActiveModel {}
