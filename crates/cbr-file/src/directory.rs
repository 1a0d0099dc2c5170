//! File-backed identity service.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use cbr_core::error::{Error, InvalidInputError};
use cbr_core::directory::{ENABLED, USER_CREATE_DATE, USER_LAST_MODIFIED_DATE, USER_STATUS};
use cbr_core::{
    Attribute, CreateUserRequest, Cursor, IdentityService, Page, Pool, PoolId, Result, UserRecord,
    Username,
};

use crate::store::DirectoryStore;

/// bcrypt cost for stored temporary passwords.
const HASH_COST: u32 = 6;

/// Status of a freshly created user that must replace its temporary password.
const FORCE_CHANGE_PASSWORD: &str = "FORCE_CHANGE_PASSWORD";

/// Filesystem-backed user directory.
///
/// Behaves like the network service for the operations the pipeline uses:
/// listing is paged with at most [`MAX_PAGE_SIZE`](crate::MAX_PAGE_SIZE)
/// items per page, and creation assigns `sub`, timestamps, and status.
#[derive(Debug, Clone)]
pub struct FileDirectory {
    store: DirectoryStore,
}

impl FileDirectory {
    /// Open (or lazily create) a local directory rooted at `root`.
    pub fn new(root: impl AsRef<std::path::Path>) -> Self {
        Self {
            store: DirectoryStore::new(root),
        }
    }

    /// Create an empty pool named `name`.
    pub fn create_pool(&self, name: &str) -> Result<Pool> {
        self.store.create_pool(name)
    }

    /// Store a listing record verbatim, without a password.
    ///
    /// Used to seed a directory with users as another service reported them.
    pub fn insert_user(&self, pool: &PoolId, record: UserRecord) -> Result<()> {
        self.store.insert_user(pool, record, None)
    }

    /// Check `password` against the temporary password stored for a user.
    ///
    /// Returns `false` for unknown users and users without a password.
    pub fn verify_password(
        &self,
        pool: &PoolId,
        username: &Username,
        password: &str,
    ) -> Result<bool> {
        match self.store.password_hash(pool, username)? {
            Some(hash) => bcrypt::verify(password, &hash).map_err(|e| {
                Error::InvalidInput(InvalidInputError::Other {
                    message: e.to_string(),
                })
            }),
            None => Ok(false),
        }
    }
}

#[async_trait]
impl IdentityService for FileDirectory {
    async fn list_pools(&self, limit: u32, cursor: Option<&Cursor>) -> Result<Page<Pool>> {
        self.store.list_pools(limit, cursor)
    }

    async fn list_users(
        &self,
        pool: &PoolId,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<Page<UserRecord>> {
        self.store.list_users(pool, limit, cursor)
    }

    #[instrument(skip(self, request), fields(%pool, username = %request.username))]
    async fn create_user(&self, pool: &PoolId, request: &CreateUserRequest) -> Result<()> {
        // Without a caller-supplied password the service picks one itself.
        let password = match &request.temporary_password {
            Some(password) => password.clone(),
            None => Uuid::new_v4().simple().to_string(),
        };
        let password_hash = bcrypt::hash(&password, HASH_COST).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: e.to_string(),
            })
        })?;

        let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        let mut attributes = vec![Attribute::new("sub", Uuid::new_v4().to_string())];
        attributes.extend(request.attributes.iter().cloned());

        let mut record = UserRecord::new(request.username.clone(), attributes);
        record.set_field(USER_CREATE_DATE, now.clone());
        record.set_field(USER_LAST_MODIFIED_DATE, now);
        record.set_field(ENABLED, true);
        record.set_field(USER_STATUS, FORCE_CHANGE_PASSWORD);

        self.store.insert_user(pool, record, Some(password_hash))?;

        debug!("Created local user");
        Ok(())
    }
}
