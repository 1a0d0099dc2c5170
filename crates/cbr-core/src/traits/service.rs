//! Identity-service trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::directory::{CreateUserRequest, Page, Pool, UserRecord};
use crate::types::{Cursor, PoolId};

/// The three capabilities the backup/restore pipeline needs from a
/// user-directory service.
///
/// Implementations own their transport, authentication, and retry policy.
/// An error returned from any method is final for that call.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// List one page of pools, starting at `cursor` (or the beginning).
    async fn list_pools(&self, limit: u32, cursor: Option<&Cursor>) -> Result<Page<Pool>>;

    /// List one page of users in `pool`, starting at `cursor`.
    ///
    /// The service may return fewer than `limit` users even when more
    /// pages follow.
    async fn list_users(
        &self,
        pool: &PoolId,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<Page<UserRecord>>;

    /// Create a user in `pool`.
    async fn create_user(&self, pool: &PoolId, request: &CreateUserRequest) -> Result<()>;
}

#[async_trait]
impl<T: IdentityService + ?Sized> IdentityService for Arc<T> {
    async fn list_pools(&self, limit: u32, cursor: Option<&Cursor>) -> Result<Page<Pool>> {
        (**self).list_pools(limit, cursor).await
    }

    async fn list_users(
        &self,
        pool: &PoolId,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<Page<UserRecord>> {
        (**self).list_users(pool, limit, cursor).await
    }

    async fn create_user(&self, pool: &PoolId, request: &CreateUserRequest) -> Result<()> {
        (**self).create_user(pool, request).await
    }
}
