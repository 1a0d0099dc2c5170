//! Restore command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use cbr::{CommandStrategy, PasswordResolver, RestoreReader, restore_target};
use cbr_core::PoolSelector;

use super::PacingArgs;
use crate::cli::ConnectionArgs;
use crate::output;
use crate::service::CliService;

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Pool to restore into (a single pool; `all` is rejected)
    #[arg(long, visible_alias = "pool")]
    pub userpool: String,

    /// Snapshot file to restore from
    #[arg(short, long)]
    pub file: PathBuf,

    /// Temporary password of restored users, and the fallback of the
    /// password module. Without one the service generates passwords.
    #[arg(long, visible_alias = "pwd")]
    pub password: Option<String>,

    /// Program run as `<program> <username>` that prints a user's password
    #[arg(long, visible_aliases = ["passwordModulePath", "pwdModule"])]
    pub password_module_path: Option<PathBuf>,

    #[command(flatten)]
    pub pacing: PacingArgs,

    /// Print a JSON summary instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Summary {
    pool: String,
    total: usize,
    created: usize,
    failed: Vec<Failed>,
}

#[derive(Serialize)]
struct Failed {
    username: String,
    error: String,
}

/// Returns whether every user was created.
pub async fn run(connection: &ConnectionArgs, args: RestoreArgs) -> Result<bool> {
    let selector = PoolSelector::parse(&args.userpool).context("Invalid pool")?;
    let pool = restore_target(&selector)?;

    let passwords = match (&args.password_module_path, args.password.clone()) {
        (Some(path), Some(fallback)) => {
            PasswordResolver::pluggable(CommandStrategy::load(path)?, fallback)
        }
        (Some(path), None) => {
            PasswordResolver::pluggable_or_generated(CommandStrategy::load(path)?)
        }
        (None, Some(password)) => PasswordResolver::fixed(password),
        (None, None) => PasswordResolver::generated(),
    };

    let service = CliService::connect(connection).await?;
    let reader = RestoreReader::new(&service, args.pacing.config(), passwords);
    let report = reader
        .restore(&pool, &args.file)
        .await
        .context("Restore failed")?;

    if args.json {
        output::json(&Summary {
            pool: report.pool.to_string(),
            total: report.total,
            created: report.created.len(),
            failed: report
                .failures
                .iter()
                .map(|f| Failed {
                    username: f.username.to_string(),
                    error: f.source.to_string(),
                })
                .collect(),
        })?;
        return Ok(report.is_success());
    }

    for failure in &report.failures {
        output::error(&failure.to_string());
    }
    if report.is_success() {
        output::success(&format!(
            "Restored {} users into {}",
            report.created.len(),
            report.pool
        ));
    } else {
        output::error(&format!(
            "Restored {} of {} users into {}",
            report.created.len(),
            report.total,
            report.pool
        ));
    }

    Ok(report.is_success())
}
