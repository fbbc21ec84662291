use std::{ffi::OsString, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    integrations::github::GithubTracker,
    migration::Migration,
    records::read_records,
    settings::{Settings, TOKEN_ENV},
};

mod integrations;
mod migration;
mod records;
mod settings;

pub type Result<T> = anyhow::Result<T>;

/// Create GitHub issues from a Notion database CSV export.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// CSV file exported from Notion
    csv_file: PathBuf,

    /// JSON configuration file; defaults are used when absent
    config_file: Option<PathBuf>,

    /// Map and log every issue without calling GitHub for labels or issues
    #[arg(long)]
    dry_run: bool,
}

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    ExitCode::from(run(std::env::args_os()).await)
}

/// Parses `args` and runs the import, returning the process exit status.
///
/// Usage errors exit with 1 rather than clap's 2; `--help` and `--version`
/// print and exit 0.
async fn run<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(io) = e.print() {
                error!("Could not print usage: {io}");
            }
            return if e.use_stderr() { EXIT_FAILURE } else { EXIT_OK };
        }
    };

    match migrate(cli).await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("Migration failed: {e:#}");
            EXIT_FAILURE
        }
    }
}

async fn migrate(cli: Cli) -> Result<()> {
    let settings =
        Settings::new(cli.config_file.as_deref()).context("Failed to load configuration")?;

    if settings.github.token.is_empty() {
        warn!("No GitHub token configured; set {TOKEN_ENV} or github.token");
    }

    let records = read_records(&cli.csv_file).await?;
    info!(
        "Importing {} records into {}/{}",
        records.len(),
        settings.github.owner,
        settings.github.repo
    );

    let tracker = GithubTracker::new(&settings.github).context("Failed to create GitHub client")?;

    Migration::new(&settings, &tracker)
        .dry_run(cli.dry_run)
        .run(&records)
        .await;

    Ok(())
}
