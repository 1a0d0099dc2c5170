//! Backup: pool listing to snapshot files.

use std::fs;
use std::path::{Path, PathBuf};

use futures_util::{Stream, StreamExt, pin_mut};
use tracing::{info, instrument, warn};

use cbr_core::{IdentityService, Pool, PoolSelector, UserRecord};

use crate::batcher::BatchConfig;
use crate::error::PipelineError;
use crate::lister::PagedLister;
use crate::pools::{Mode, PoolResolver};
use crate::snapshot::{snapshot_path, write_snapshot};

/// A snapshot written for one pool.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    /// The pool that was backed up.
    pub pool: Pool,
    /// Where the snapshot was written.
    pub path: PathBuf,
    /// Number of users in the snapshot.
    pub users: usize,
}

/// A pool whose backup failed.
#[derive(Debug)]
pub struct PoolFailure {
    pub pool: Pool,
    pub error: PipelineError,
}

/// Outcome of a backup run over one or more pools.
#[derive(Debug, Default)]
pub struct BackupReport {
    /// Snapshots written, in pool order.
    pub written: Vec<SnapshotFile>,
    /// Pools that could not be backed up.
    pub failed: Vec<PoolFailure>,
}

impl BackupReport {
    /// Returns true if every pool was written.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of users across the written snapshots.
    pub fn total_users(&self) -> usize {
        self.written.iter().map(|s| s.users).sum()
    }
}

/// Writes the users of each selected pool to `<directory>/<poolId>.json`.
pub struct BackupWriter<'a, S: IdentityService + ?Sized> {
    service: &'a S,
    directory: PathBuf,
    config: BatchConfig,
}

impl<'a, S: IdentityService + ?Sized> BackupWriter<'a, S> {
    /// Create a writer that stores snapshots in `directory`.
    pub fn new(service: &'a S, directory: impl AsRef<Path>, config: BatchConfig) -> Self {
        Self {
            service,
            directory: directory.as_ref().to_path_buf(),
            config,
        }
    }

    /// Back up every pool matched by `selector`.
    ///
    /// Selector resolution failures abort the run. A pool whose listing
    /// fails is recorded in the report and the remaining pools still run.
    #[instrument(skip(self), fields(%selector, directory = %self.directory.display()))]
    pub async fn backup(&self, selector: &PoolSelector) -> Result<BackupReport, PipelineError> {
        let pools = PoolResolver::new(self.service, self.config)
            .resolve(selector, Mode::Backup)
            .await?;

        let mut report = BackupReport::default();
        for pool in pools {
            match self.backup_pool(&pool).await {
                Ok(snapshot) => report.written.push(snapshot),
                Err(error) => {
                    warn!(pool = %pool.id, %error, "Pool backup failed");
                    report.failed.push(PoolFailure { pool, error });
                }
            }
        }

        info!(
            written = report.written.len(),
            failed = report.failed.len(),
            users = report.total_users(),
            "Backup finished"
        );
        Ok(report)
    }

    /// Back up a single pool.
    pub async fn backup_pool(&self, pool: &Pool) -> Result<SnapshotFile, PipelineError> {
        let lister = PagedLister::new(self.service, self.config);
        self.write_stream(pool, lister.user_pages(&pool.id)).await
    }

    /// Drain `pages` and write them as the snapshot of `pool`.
    ///
    /// Nothing is written unless the stream completes: an error from any
    /// page leaves the destination untouched.
    pub async fn write_stream<P>(&self, pool: &Pool, pages: P) -> Result<SnapshotFile, PipelineError>
    where
        P: Stream<Item = Result<Vec<UserRecord>, PipelineError>>,
    {
        pin_mut!(pages);

        let mut users = Vec::new();
        while let Some(page) = pages.next().await {
            users.extend(page?);
        }

        let path = snapshot_path(&self.directory, &pool.id);
        fs::create_dir_all(&self.directory).map_err(|source| PipelineError::SnapshotWrite {
            path: path.clone(),
            source,
        })?;
        write_snapshot(&path, &users)?;

        info!(pool = %pool.id, users = users.len(), path = %path.display(), "Pool backed up");

        Ok(SnapshotFile {
            pool: pool.clone(),
            path,
            users: users.len(),
        })
    }
}
