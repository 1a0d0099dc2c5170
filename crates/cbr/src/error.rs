//! Pipeline error taxonomy.
//!
//! Fatal errors abort the current pool's operation. Per-record creation
//! failures are [`RecordCreateError`]s, collected by the restore run rather
//! than propagated.

use std::path::PathBuf;

use thiserror::Error;

use cbr_core::{PoolId, Username};

/// Errors raised by the backup/restore pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Listing the users of a pool failed after the client's own retries.
    #[error("failed to list users of pool {pool}: {source}")]
    RemoteList {
        pool: PoolId,
        #[source]
        source: cbr_core::Error,
    },

    /// Enumerating the pools of the account failed.
    #[error("failed to list pools: {0}")]
    PoolList(#[source] cbr_core::Error),

    /// The wildcard matched no pools.
    #[error("no user pools found")]
    NoPoolsFound,

    /// Restore was asked to target every pool.
    #[error("restore requires a single pool; 'all' is only valid for backup")]
    WildcardRestore,

    /// The snapshot is missing, unreadable, or not a JSON array of users.
    #[error("invalid snapshot {}: {reason}", path.display())]
    SnapshotFormat { path: PathBuf, reason: String },

    /// The snapshot could not be written.
    #[error("failed to write snapshot {}: {source}", path.display())]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pluggable password strategy is missing or unusable.
    #[error("cannot load password module {}: {reason}", path.display())]
    PasswordModuleConfig { path: PathBuf, reason: String },

    /// A single user could not be created.
    #[error(transparent)]
    RecordCreate(#[from] RecordCreateError),
}

/// A user that failed to be created during restore.
#[derive(Debug, Error)]
#[error("failed to create user {username}: {source}")]
pub struct RecordCreateError {
    /// The username of the failed record.
    pub username: Username,
    /// The service error.
    #[source]
    pub source: cbr_core::Error,
}
