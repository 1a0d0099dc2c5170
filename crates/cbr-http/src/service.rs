//! HTTP-backed identity service.

use async_trait::async_trait;
use serde::de::IgnoredAny;
use tracing::{debug, instrument};

use cbr_core::{
    CreateUserRequest, Cursor, Endpoint, IdentityService, Page, Pool, PoolId, Result, UserRecord,
};

use crate::client::{ApiClient, RetryPolicy};
use crate::endpoints::*;

/// A network-backed identity service.
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    client: ApiClient,
}

impl HttpIdentityService {
    /// Create a service client for `endpoint`.
    ///
    /// Requests are sent unsigned, which local emulators and signing
    /// proxies accept and the hosted service rejects.
    pub fn new(endpoint: Endpoint, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(endpoint, retry)?,
        })
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    #[instrument(skip(self))]
    async fn list_pools(&self, limit: u32, cursor: Option<&Cursor>) -> Result<Page<Pool>> {
        debug!("Listing pools");

        let request = ListUserPoolsRequest {
            max_results: limit,
            next_token: cursor.map(Cursor::as_str),
        };

        let response: ListUserPoolsResponse = self.client.call(LIST_USER_POOLS, &request).await?;

        let items = response
            .user_pools
            .into_iter()
            .map(|p| {
                let id = PoolId::new(p.id)?;
                let name = p.name.unwrap_or_else(|| id.as_str().to_string());
                Ok(Pool { id, name })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            cursor: Cursor::from_token(response.next_token),
        })
    }

    #[instrument(skip(self), fields(%pool))]
    async fn list_users(
        &self,
        pool: &PoolId,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<Page<UserRecord>> {
        debug!("Listing users");

        let request = ListUsersRequest {
            user_pool_id: pool.as_str(),
            limit,
            pagination_token: cursor.map(Cursor::as_str),
        };

        let response: ListUsersResponse = self.client.call(LIST_USERS, &request).await?;

        Ok(Page {
            items: response.users,
            cursor: Cursor::from_token(response.pagination_token),
        })
    }

    #[instrument(skip(self, request), fields(%pool, username = %request.username))]
    async fn create_user(&self, pool: &PoolId, request: &CreateUserRequest) -> Result<()> {
        debug!("Creating user");

        let body = AdminCreateUserRequest {
            user_pool_id: pool.as_str(),
            username: request.username.as_str(),
            user_attributes: &request.attributes,
            temporary_password: request.temporary_password.as_deref(),
            message_action: request.message_action,
        };

        let _: IgnoredAny = self.client.call(ADMIN_CREATE_USER, &body).await?;
        Ok(())
    }
}
