use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::sync::trigger_sync))
        .routes(routes!(handlers::health::health))
        .nest("/plants", plant_routes())
}

fn plant_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::plant::list_plants))
        .routes(routes!(handlers::plant::get_plant))
}
