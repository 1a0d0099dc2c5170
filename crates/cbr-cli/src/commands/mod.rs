//! Subcommand implementations.

pub mod backup;
pub mod restore;

use std::time::Duration;

use clap::Args;

use cbr::{BatchConfig, DEFAULT_PAGE_SIZE};

/// Pacing options shared by backup and restore.
#[derive(Args, Debug)]
pub struct PacingArgs {
    /// Delay in milliseconds between batches, to stay under the rate limit
    #[arg(long, default_value_t = 0)]
    pub delay: u64,

    /// Users per batch (at most 60)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE,
          value_parser = clap::value_parser!(u32).range(1..=DEFAULT_PAGE_SIZE as i64))]
    pub page_size: u32,
}

impl PacingArgs {
    pub fn config(&self) -> BatchConfig {
        BatchConfig {
            page_size: self.page_size,
            delay: Duration::from_millis(self.delay),
        }
    }
}
