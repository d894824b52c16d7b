use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{Level, info};

use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;
use server::sync::SyncService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.auth.sync_api_key.is_empty() {
        anyhow::bail!("auth.sync_api_key must not be empty");
    }

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    let storage = common::storage::build_object_store(&config.storage)
        .await
        .context("Failed to initialize photo storage")?;
    let sync = SyncService::from_config(db.clone(), &config, storage)
        .context("Failed to build sync service")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host / server.port")?;

    let state = AppState {
        db,
        config: Arc::new(config),
        sync: Arc::new(sync),
    };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
