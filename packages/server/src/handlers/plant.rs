use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{photo, plant};
use crate::error::{AppError, ErrorBody};
use crate::models::plant::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Plants",
    operation_id = "listPlants",
    summary = "List active plants",
    description = "Returns every active plant ordered by localized name, with photo count, newest remote photo timestamp and a thumbnail URL.",
    responses(
        (status = 200, description = "Plant list", body = PlantListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_plants(State(state): State<AppState>) -> Result<Json<PlantListResponse>, AppError> {
    let plants = plant::Entity::find()
        .filter(plant::Column::IsActive.eq(true))
        .order_by_asc(plant::Column::LocalizedName)
        .all(&state.db)
        .await?;

    let ids: Vec<Uuid> = plants.iter().map(|p| p.id).collect();
    let mut by_plant: HashMap<Uuid, Vec<photo::Model>> = HashMap::new();
    if !ids.is_empty() {
        for p in photo::Entity::find()
            .filter(photo::Column::PlantId.is_in(ids))
            .all(&state.db)
            .await?
        {
            by_plant.entry(p.plant_id).or_default().push(p);
        }
    }

    let data = plants
        .into_iter()
        .map(|plant| {
            let mut photos = by_plant.remove(&plant.id).unwrap_or_default();
            sort_timeline(&mut photos);
            PlantSummary::new(plant, &photos)
        })
        .collect();

    Ok(Json(PlantListResponse { data }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Plants",
    operation_id = "getPlant",
    summary = "Get a plant with its photo timeline",
    description = "Returns one active plant and its photos: remote photos newest first, then historical photos by display order.",
    params(("id" = Uuid, Path, description = "Plant ID")),
    responses(
        (status = 200, description = "Plant detail", body = PlantDetailResponse),
        (status = 404, description = "Plant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_plant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlantDetailResponse>, AppError> {
    let plant = plant::Entity::find_by_id(id)
        .filter(plant::Column::IsActive.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant not found".into()))?;

    let mut photos = photo::Entity::find()
        .filter(photo::Column::PlantId.eq(plant.id))
        .all(&state.db)
        .await?;
    sort_timeline(&mut photos);

    Ok(Json(PlantDetailResponse::new(plant, photos)))
}
