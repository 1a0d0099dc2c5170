//! Restore: snapshot file to user creations.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use cbr_core::{CreateUserRequest, IdentityService, PoolId, Username};

use crate::batcher::{BatchConfig, RateLimitedBatcher};
use crate::error::{PipelineError, RecordCreateError};
use crate::password::PasswordResolver;
use crate::snapshot::read_snapshot;

/// Outcome of restoring one snapshot.
#[derive(Debug)]
pub struct RestoreReport {
    /// The target pool.
    pub pool: PoolId,
    /// Number of records in the snapshot.
    pub total: usize,
    /// Users created, in snapshot order.
    pub created: Vec<Username>,
    /// Users that could not be created, in snapshot order.
    pub failures: Vec<RecordCreateError>,
}

impl RestoreReport {
    /// Returns true if every record was created.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Re-creates the users of a snapshot in a target pool.
///
/// Creates are issued one at a time in snapshot order, grouped into
/// windows of the configured page size with the configured delay between
/// windows.
pub struct RestoreReader<'a, S: IdentityService + ?Sized> {
    service: &'a S,
    config: BatchConfig,
    passwords: PasswordResolver,
}

impl<'a, S: IdentityService + ?Sized> RestoreReader<'a, S> {
    /// Create a reader that assigns passwords with `passwords`.
    pub fn new(service: &'a S, config: BatchConfig, passwords: PasswordResolver) -> Self {
        Self {
            service,
            config,
            passwords,
        }
    }

    /// Restore the snapshot at `snapshot` into `pool`.
    ///
    /// A malformed snapshot fails before any user is created. A user that
    /// cannot be created is recorded in the report and the rest continue.
    #[instrument(skip(self, snapshot), fields(%pool, snapshot = %snapshot.as_ref().display()))]
    pub async fn restore(
        &self,
        pool: &PoolId,
        snapshot: impl AsRef<Path>,
    ) -> Result<RestoreReport, PipelineError> {
        let records = read_snapshot(snapshot.as_ref())?;

        let mut report = RestoreReport {
            pool: pool.clone(),
            total: records.len(),
            created: Vec::with_capacity(records.len()),
            failures: Vec::new(),
        };

        let mut batcher = RateLimitedBatcher::new(self.config.delay);
        for window in records.chunks(self.config.window_size() as usize) {
            batcher.next_window().await;
            debug!(window = batcher.windows(), users = window.len(), "Restoring window");

            for record in window {
                let password = self.passwords.resolve(&record.username).await;
                let request = CreateUserRequest::from_record(record, password);

                match self.service.create_user(pool, &request).await {
                    Ok(()) => report.created.push(record.username.clone()),
                    Err(source) => {
                        let failure = RecordCreateError {
                            username: record.username.clone(),
                            source,
                        };
                        warn!(error = %failure, "User not restored");
                        report.failures.push(failure);
                    }
                }
            }
        }

        info!(
            total = report.total,
            created = report.created.len(),
            failed = report.failures.len(),
            "Restore finished"
        );
        Ok(report)
    }
}
