//! `leafline`: one-shot sync, historical photo backfill and token bootstrap.

mod cli;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use tracing::{Level, info};

use cli::{BackfillArgs, BootstrapTokenArgs, Cli, Command};
use server::backfill::{BackfillOptions, load_mapping, run_backfill};
use server::config::AppConfig;
use server::database::init_db;
use server::seed::{BootstrapToken, seed_sync_token};
use server::sync::{SyncError, SyncService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;

    match cli.command {
        Command::Sync => run_sync(db, &config).await,
        Command::Backfill(args) => run_backfill_command(db, &config, args).await,
        Command::BootstrapToken(args) => run_bootstrap(db, args).await,
    }
}

async fn run_sync(db: sea_orm::DatabaseConnection, config: &AppConfig) -> anyhow::Result<()> {
    let storage = common::storage::build_object_store(&config.storage)
        .await
        .context("Failed to initialize photo storage")?;
    let sync = SyncService::from_config(db, config, storage)
        .context("Failed to build sync service")?;

    let report = match sync.run().await {
        Ok(report) => report,
        Err(e) => {
            if let Some(hint) = bootstrap_hint(&e) {
                eprintln!("{hint}");
            }
            return Err(e).context("Sync failed");
        }
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Operator hint for failures that only a new token pair can fix.
fn bootstrap_hint(err: &SyncError) -> Option<&'static str> {
    match err {
        SyncError::Remote(e) if e.requires_bootstrap() => Some(
            "hint: store a fresh token pair with `leafline bootstrap-token --access-token <..> --refresh-token <..>`",
        ),
        _ => None,
    }
}

async fn run_backfill_command(
    db: sea_orm::DatabaseConnection,
    config: &AppConfig,
    args: BackfillArgs,
) -> anyhow::Result<()> {
    let mapping = load_mapping(&args.mapping).await?;
    let storage = common::storage::build_object_store(&config.storage)
        .await
        .context("Failed to initialize photo storage")?;
    let options = BackfillOptions {
        photos_root: args.photos_root,
        historical_prefix: config.storage.historical_prefix.clone(),
        dry_run: args.dry_run,
    };

    let report = run_backfill(&db, storage.as_ref(), &mapping, &options).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.errors.is_empty() {
        anyhow::bail!("Backfill finished with {} error(s)", report.errors.len());
    }
    Ok(())
}

async fn run_bootstrap(
    db: sea_orm::DatabaseConnection,
    args: BootstrapTokenArgs,
) -> anyhow::Result<()> {
    let expires_at = args
        .expires_at
        .unwrap_or_else(|| Utc::now() - Duration::seconds(1));
    seed_sync_token(
        &db,
        &BootstrapToken {
            access_token: args.access_token,
            refresh_token: args.refresh_token,
            expires_at,
        },
    )
    .await
    .context("Failed to store sync token")?;

    info!(%expires_at, "Sync token stored");
    Ok(())
}
