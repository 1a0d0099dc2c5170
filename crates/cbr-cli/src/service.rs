//! Identity service selection for CLI use.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use cbr_aws::SdkIdentityService;
use cbr_core::{
    CreateUserRequest, Cursor, Endpoint, IdentityService, Page, Pool, PoolId, UserRecord,
};
use cbr_file::FileDirectory;
use cbr_http::{HttpIdentityService, RetryPolicy};

use crate::cli::ConnectionArgs;

/// Hosts under this domain only accept signed requests.
const HOSTED_SERVICE_DOMAIN: &str = ".amazonaws.com";

/// Service wrapper for CLI use.
#[derive(Debug)]
pub enum CliService {
    File(FileDirectory),
    Http(HttpIdentityService),
    Sdk(SdkIdentityService),
}

impl CliService {
    /// Open the service named by `--endpoint`, or the hosted service of
    /// `--region`/`--profile` when no endpoint is given.
    ///
    /// An `--endpoint` URL is reached without request signing, so it must be
    /// a local directory, an emulator, or a signing proxy.
    pub async fn connect(args: &ConnectionArgs) -> Result<Self> {
        let Some(endpoint) = &args.endpoint else {
            let service = SdkIdentityService::load(
                args.region.clone(),
                args.profile.clone(),
                args.max_retries,
            )
            .await
            .context("Failed to configure the identity service")?;
            return Ok(CliService::Sdk(service));
        };

        let endpoint = Endpoint::new(endpoint).context("Invalid endpoint")?;

        if let Some(root) = endpoint.to_file_path() {
            debug!(root = %root.display(), "Using local directory");
            return Ok(CliService::File(FileDirectory::new(root)));
        }

        if endpoint
            .host()
            .is_some_and(|host| host.ends_with(HOSTED_SERVICE_DOMAIN))
        {
            anyhow::bail!(
                "{} needs signed requests. Drop --endpoint and pass --region (and --profile) instead.",
                endpoint
            );
        }

        let retry = RetryPolicy {
            max_retries: args.max_retries,
            ..RetryPolicy::default()
        };
        debug!(%endpoint, "Using unsigned network service");
        let service =
            HttpIdentityService::new(endpoint, retry).context("Failed to create HTTP client")?;
        Ok(CliService::Http(service))
    }
}

#[async_trait]
impl IdentityService for CliService {
    async fn list_pools(&self, limit: u32, cursor: Option<&Cursor>) -> cbr_core::Result<Page<Pool>> {
        match self {
            CliService::File(service) => service.list_pools(limit, cursor).await,
            CliService::Http(service) => service.list_pools(limit, cursor).await,
            CliService::Sdk(service) => service.list_pools(limit, cursor).await,
        }
    }

    async fn list_users(
        &self,
        pool: &PoolId,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> cbr_core::Result<Page<UserRecord>> {
        match self {
            CliService::File(service) => service.list_users(pool, limit, cursor).await,
            CliService::Http(service) => service.list_users(pool, limit, cursor).await,
            CliService::Sdk(service) => service.list_users(pool, limit, cursor).await,
        }
    }

    async fn create_user(&self, pool: &PoolId, request: &CreateUserRequest) -> cbr_core::Result<()> {
        match self {
            CliService::File(service) => service.create_user(pool, request).await,
            CliService::Http(service) => service.create_user(pool, request).await,
            CliService::Sdk(service) => service.create_user(pool, request).await,
        }
    }
}
