//! Resolution of a pool selector into concrete pools.

use futures_util::{StreamExt, pin_mut};
use tracing::{info, instrument};

use cbr_core::{IdentityService, Pool, PoolId, PoolSelector};

use crate::batcher::BatchConfig;
use crate::error::PipelineError;
use crate::lister::PagedLister;

/// The operation a selector is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Backup accepts the wildcard.
    Backup,
    /// Restore needs exactly one pool.
    Restore,
}

/// Turns a [`PoolSelector`] into the pools an operation runs against.
pub struct PoolResolver<'a, S: IdentityService + ?Sized> {
    service: &'a S,
    config: BatchConfig,
}

impl<'a, S: IdentityService + ?Sized> PoolResolver<'a, S> {
    /// Create a resolver over `service`.
    pub fn new(service: &'a S, config: BatchConfig) -> Self {
        Self { service, config }
    }

    /// Resolve `selector` for `mode`.
    ///
    /// A concrete pool is returned as-is without an existence check; a
    /// missing pool surfaces later as a listing or create error. The
    /// wildcard enumerates every pool in service order, following the
    /// pool-listing cursor to the end.
    #[instrument(skip(self), fields(%selector))]
    pub async fn resolve(
        &self,
        selector: &PoolSelector,
        mode: Mode,
    ) -> Result<Vec<Pool>, PipelineError> {
        match selector {
            PoolSelector::Pool(id) => Ok(vec![Pool::from_id(id.clone())]),
            PoolSelector::All if mode == Mode::Restore => Err(PipelineError::WildcardRestore),
            PoolSelector::All => {
                let lister = PagedLister::new(self.service, self.config);
                let pages = lister.pool_pages();
                pin_mut!(pages);

                let mut pools = Vec::new();
                while let Some(page) = pages.next().await {
                    pools.extend(page?);
                }

                if pools.is_empty() {
                    return Err(PipelineError::NoPoolsFound);
                }

                info!(count = pools.len(), "Resolved wildcard selector");
                Ok(pools)
            }
        }
    }
}

/// The single pool a restore targets.
///
/// Fails with [`PipelineError::WildcardRestore`] for the wildcard, without
/// touching the service.
pub fn restore_target(selector: &PoolSelector) -> Result<PoolId, PipelineError> {
    match selector {
        PoolSelector::Pool(id) => Ok(id.clone()),
        PoolSelector::All => Err(PipelineError::WildcardRestore),
    }
}
