//! SDK-backed identity service.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentityprovider::Client;
use aws_sdk_cognitoidentityprovider::types::MessageActionType;
use tracing::{debug, info, instrument};

use cbr_core::error::{Error, InvalidInputError};
use cbr_core::{
    CreateUserRequest, Cursor, IdentityService, MessageAction, Page, Pool, PoolId, Result,
    UserRecord,
};

use crate::convert;

/// The hosted identity service, reached through the SDK client.
///
/// Credentials come from the SDK's default provider chain and every request
/// is signed. Throttled calls are retried by the SDK's standard retry mode.
#[derive(Debug, Clone)]
pub struct SdkIdentityService {
    client: Client,
}

impl SdkIdentityService {
    /// Load shared configuration and build a client.
    ///
    /// `region` and `profile` override what the environment and the shared
    /// config files say. `max_retries` counts retries after the first
    /// attempt.
    ///
    /// # Errors
    ///
    /// Fails when no region can be resolved from any source.
    pub async fn load(
        region: Option<String>,
        profile: Option<String>,
        max_retries: u32,
    ) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(max_retries.saturating_add(1)));
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(profile) = &profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        let region = sdk_config.region().cloned().ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::Other {
                message: "no region configured; pass --region or set AWS_REGION".to_string(),
            })
        })?;

        info!(%region, profile = ?profile, "Identity service client initialized");

        Ok(Self {
            client: Client::new(&sdk_config),
        })
    }

    /// Build a client from an explicit SDK configuration.
    pub fn from_conf(config: aws_sdk_cognitoidentityprovider::Config) -> Self {
        Self {
            client: Client::from_conf(config),
        }
    }
}

fn message_action(action: MessageAction) -> MessageActionType {
    match action {
        MessageAction::Suppress => MessageActionType::Suppress,
    }
}

#[async_trait]
impl IdentityService for SdkIdentityService {
    #[instrument(skip(self))]
    async fn list_pools(&self, limit: u32, cursor: Option<&Cursor>) -> Result<Page<Pool>> {
        debug!("Listing pools");

        let output = self
            .client
            .list_user_pools()
            .max_results(limit as i32)
            .set_next_token(cursor.map(|c| c.as_str().to_string()))
            .send()
            .await
            .map_err(convert::sdk_error)?;

        let items = output
            .user_pools()
            .iter()
            .map(convert::pool)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            cursor: Cursor::from_token(output.next_token().map(str::to_string)),
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

        let output = self
            .client
            .list_users()
            .user_pool_id(pool.as_str())
            .limit(limit as i32)
            .set_pagination_token(cursor.map(|c| c.as_str().to_string()))
            .send()
            .await
            .map_err(convert::sdk_error)?;

        let items = output
            .users()
            .iter()
            .map(convert::record)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            cursor: Cursor::from_token(output.pagination_token().map(str::to_string)),
        })
    }

    #[instrument(skip(self, request), fields(%pool, username = %request.username))]
    async fn create_user(&self, pool: &PoolId, request: &CreateUserRequest) -> Result<()> {
        debug!("Creating user");

        let attributes = request
            .attributes
            .iter()
            .map(convert::attribute)
            .collect::<Result<Vec<_>>>()?;

        self.client
            .admin_create_user()
            .user_pool_id(pool.as_str())
            .username(request.username.as_str())
            .set_user_attributes(Some(attributes))
            .set_temporary_password(request.temporary_password.clone())
            .message_action(message_action(request.message_action))
            .send()
            .await
            .map_err(convert::sdk_error)?;

        Ok(())
    }
}
