//! cbr - Backup and restore pipeline for managed user pools.
//!
//! The pipeline moves every user of a pool between an
//! [`IdentityService`](cbr_core::IdentityService) and JSON snapshots on disk:
//!
//! - backup: [`PoolResolver`] → [`PagedLister`] (paced by
//!   [`RateLimitedBatcher`]) → [`BackupWriter`] → one `<poolId>.json` per pool
//! - restore: [`RestoreReader`] loads one snapshot → [`PasswordResolver`]
//!   supplies each credential → users are re-created in the target pool,
//!   paced exactly like backup
//!
//! The pipeline is strictly sequential: one pool at a time, one page at a
//! time, one user at a time.

pub mod backup;
pub mod batcher;
pub mod error;
pub mod lister;
pub mod password;
pub mod pools;
pub mod restore;
pub mod snapshot;

pub use backup::{BackupReport, BackupWriter, PoolFailure, SnapshotFile};
pub use batcher::{BatchConfig, DEFAULT_PAGE_SIZE, RateLimitedBatcher};
pub use error::{PipelineError, RecordCreateError};
pub use lister::PagedLister;
pub use password::{
    CommandStrategy, DEFAULT_COMMAND_TIMEOUT, PasswordResolver, PasswordStrategy, StrategyError,
};
pub use pools::{Mode, PoolResolver, restore_target};
pub use restore::{RestoreReader, RestoreReport};
pub use snapshot::{read_snapshot, snapshot_path, write_snapshot};
