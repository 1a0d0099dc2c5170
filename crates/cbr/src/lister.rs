//! Cursor-driven traversal of the listing endpoints.
//!
//! Each traversal is a lazy, finite stream that is not restartable. Page
//! N+1 is requested only after page N has been yielded, and the batcher's
//! delay elapses before every request except the first.

use futures_util::{Stream, StreamExt, pin_mut};
use tracing::{debug, instrument};

use cbr_core::{Cursor, IdentityService, Pool, PoolId, UserRecord};

use crate::batcher::{BatchConfig, RateLimitedBatcher};
use crate::error::PipelineError;

/// Walks a paginated listing until the service stops returning a cursor.
///
/// The page size is only a request: the lister follows whatever cursor the
/// service hands back, however many items each page actually holds.
pub struct PagedLister<'a, S: IdentityService + ?Sized> {
    service: &'a S,
    config: BatchConfig,
}

impl<'a, S: IdentityService + ?Sized> PagedLister<'a, S> {
    /// Create a lister over `service`.
    pub fn new(service: &'a S, config: BatchConfig) -> Self {
        Self { service, config }
    }

    /// Stream the users of `pool` one page at a time.
    ///
    /// A failed listing call ends the stream with
    /// [`PipelineError::RemoteList`].
    pub fn user_pages(
        &self,
        pool: &PoolId,
    ) -> impl Stream<Item = Result<Vec<UserRecord>, PipelineError>> + use<'a, S> {
        let service = self.service;
        let limit = self.config.window_size();
        let delay = self.config.delay;
        let pool = pool.clone();

        async_stream::try_stream! {
            let mut batcher = RateLimitedBatcher::new(delay);
            let mut cursor: Option<Cursor> = None;

            loop {
                batcher.next_window().await;

                let page = service
                    .list_users(&pool, limit, cursor.as_ref())
                    .await
                    .map_err(|source| PipelineError::RemoteList {
                        pool: pool.clone(),
                        source,
                    })?;

                debug!(
                    %pool,
                    page = batcher.windows(),
                    users = page.items.len(),
                    more = page.has_next(),
                    "Fetched user page"
                );

                cursor = page.cursor;
                yield page.items;

                if cursor.is_none() {
                    break;
                }
            }
        }
    }

    /// Stream the users of `pool` one record at a time, in listing order.
    pub fn users(
        &self,
        pool: &PoolId,
    ) -> impl Stream<Item = Result<UserRecord, PipelineError>> + use<'a, S> {
        let pages = self.user_pages(pool);

        async_stream::try_stream! {
            pin_mut!(pages);
            while let Some(page) = pages.next().await {
                for user in page? {
                    yield user;
                }
            }
        }
    }

    /// Stream every pool of the account one page at a time.
    ///
    /// A failed listing call ends the stream with
    /// [`PipelineError::PoolList`].
    pub fn pool_pages(&self) -> impl Stream<Item = Result<Vec<Pool>, PipelineError>> + use<'a, S> {
        let service = self.service;
        let limit = self.config.window_size();
        let delay = self.config.delay;

        async_stream::try_stream! {
            let mut batcher = RateLimitedBatcher::new(delay);
            let mut cursor: Option<Cursor> = None;

            loop {
                batcher.next_window().await;

                let page = service
                    .list_pools(limit, cursor.as_ref())
                    .await
                    .map_err(PipelineError::PoolList)?;

                debug!(
                    page = batcher.windows(),
                    pools = page.items.len(),
                    more = page.has_next(),
                    "Fetched pool page"
                );

                cursor = page.cursor;
                yield page.items;

                if cursor.is_none() {
                    break;
                }
            }
        }
    }

    /// Drain [`user_pages`](Self::user_pages) into one vector.
    #[instrument(skip(self))]
    pub async fn collect_users(&self, pool: &PoolId) -> Result<Vec<UserRecord>, PipelineError> {
        let pages = self.user_pages(pool);
        pin_mut!(pages);

        let mut users = Vec::new();
        while let Some(page) = pages.next().await {
            users.extend(page?);
        }
        Ok(users)
    }
}
