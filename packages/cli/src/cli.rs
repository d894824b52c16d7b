use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "leafline", about = "Operator commands for the Leafline plant gallery")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one sync pass against the plant API and print the report
    Sync,
    /// Upload archived photos from local folders as historical photos
    Backfill(BackfillArgs),
    /// Store the initial plant API token pair
    BootstrapToken(BootstrapTokenArgs),
}

#[derive(Args, Debug)]
pub struct BackfillArgs {
    /// JSON file mapping folder names to remote plant ids
    #[arg(short, long)]
    pub mapping: PathBuf,

    /// Directory holding one subfolder per plant
    #[arg(short, long)]
    pub photos_root: PathBuf,

    /// List what would be uploaded without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct BootstrapTokenArgs {
    #[arg(long, env = "LEAFLINE_BOOTSTRAP_ACCESS_TOKEN")]
    pub access_token: String,

    #[arg(long, env = "LEAFLINE_BOOTSTRAP_REFRESH_TOKEN")]
    pub refresh_token: String,

    /// RFC 3339 expiry of the access token. Defaults to already expired so the
    /// next sync refreshes immediately.
    #[arg(long)]
    pub expires_at: Option<DateTime<Utc>>,
}
