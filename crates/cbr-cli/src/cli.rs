//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::backup::BackupArgs;
use crate::commands::restore::RestoreArgs;

/// Back up and restore the users of managed user pools.
#[derive(Parser, Debug)]
#[command(name = "cbr")]
#[command(author, version = env!("CBR_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the identity service lives.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Unsigned service endpoint: an emulator or signing proxy
    /// (https://..., http://localhost...) or a local directory (file:///path)
    #[arg(long, env = "CBR_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Region of the hosted service, used when no endpoint is given
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// Shared-config profile supplying credentials and region
    #[arg(short, long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Retries of a throttled request before giving up
    #[arg(long, default_value_t = 5, global = true)]
    pub max_retries: u32,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Back up all users of one pool, or of every pool with `all`
    Backup(BackupArgs),

    /// Restore users from a snapshot into a single pool
    Restore(RestoreArgs),
}
