//! Backup command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use cbr::BackupWriter;
use cbr_core::PoolSelector;

use super::PacingArgs;
use crate::cli::ConnectionArgs;
use crate::output;
use crate::service::CliService;

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Pool to back up, or `all` for every pool
    #[arg(long, visible_alias = "pool")]
    pub userpool: String,

    /// Directory to write `<poolId>.json` snapshots to
    #[arg(long, visible_alias = "dir", default_value = ".")]
    pub directory: PathBuf,

    #[command(flatten)]
    pub pacing: PacingArgs,

    /// Print a JSON summary instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Summary {
    written: Vec<Written>,
    failed: Vec<Failed>,
}

#[derive(Serialize)]
struct Written {
    pool: String,
    path: String,
    users: usize,
}

#[derive(Serialize)]
struct Failed {
    pool: String,
    error: String,
}

/// Returns whether every selected pool was written.
pub async fn run(connection: &ConnectionArgs, args: BackupArgs) -> Result<bool> {
    let selector = PoolSelector::parse(&args.userpool).context("Invalid pool")?;
    let service = CliService::connect(connection).await?;

    let writer = BackupWriter::new(&service, &args.directory, args.pacing.config());
    let report = writer.backup(&selector).await.context("Backup failed")?;

    if args.json {
        output::json(&Summary {
            written: report
                .written
                .iter()
                .map(|s| Written {
                    pool: s.pool.id.to_string(),
                    path: s.path.display().to_string(),
                    users: s.users,
                })
                .collect(),
            failed: report
                .failed
                .iter()
                .map(|f| Failed {
                    pool: f.pool.id.to_string(),
                    error: f.error.to_string(),
                })
                .collect(),
        })?;
        return Ok(report.is_success());
    }

    for snapshot in &report.written {
        output::success(&format!(
            "Backed up {} users of {}",
            snapshot.users, snapshot.pool.name
        ));
        output::field("Pool", snapshot.pool.id.as_str());
        output::field("File", &snapshot.path.display().to_string());
    }
    for failure in &report.failed {
        output::error(&format!("{}: {}", failure.pool.id, failure.error));
    }

    Ok(report.is_success())
}
