//! Filesystem storage for the local directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};
use uuid::Uuid;

use cbr_core::error::{
    Error, InvalidInputError, RESOURCE_NOT_FOUND, ServiceError, TransportError, USERNAME_EXISTS,
};
use cbr_core::{Cursor, Page, Pool, PoolId, Result, UserRecord, Username};

use crate::key;

/// Largest page the local directory returns, matching the network service.
pub const MAX_PAGE_SIZE: u32 = 60;

fn map_io(err: std::io::Error) -> Error {
    Error::Transport(TransportError::from(err))
}

fn map_json(err: serde_json::Error) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: err.to_string(),
    })
}

fn service_error(code: &str, message: String) -> Error {
    Error::Service(ServiceError::new(400, Some(code.to_string()), Some(message)))
}

/// Pool metadata stored in `pool.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StoredPool {
    pub id: PoolId,
    pub name: String,
    pub creation_date: String,
}

/// A user file: the record as listed, plus the temporary password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredUser {
    pub record: UserRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// Filesystem-backed storage for a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a new store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn pools_dir(&self) -> PathBuf {
        self.root.join("pools")
    }

    fn pool_dir(&self, pool: &PoolId) -> PathBuf {
        self.pools_dir().join(pool.as_str())
    }

    fn pool_path(&self, pool: &PoolId) -> PathBuf {
        self.pool_dir(pool).join("pool.json")
    }

    fn users_dir(&self, pool: &PoolId) -> PathBuf {
        self.pool_dir(pool).join("users")
    }

    fn user_path(&self, pool: &PoolId, username: &Username) -> PathBuf {
        self.users_dir(pool)
            .join(format!("{}.json", key::encode(username.as_str())))
    }

    /// Write `value` as pretty JSON via a temp file and rename.
    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let content = serde_json::to_string_pretty(value).map_err(map_json)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(map_io)?;
        fs::rename(&temp_path, path).map_err(map_io)?;

        Ok(())
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let content = fs::read_to_string(path).map_err(map_io)?;
        serde_json::from_str(&content).map_err(map_json)
    }

    fn ensure_pool(&self, pool: &PoolId) -> Result<()> {
        if self.pool_path(pool).exists() {
            Ok(())
        } else {
            Err(service_error(
                RESOURCE_NOT_FOUND,
                format!("User pool {} does not exist.", pool),
            ))
        }
    }

    fn check_limit(limit: u32) -> Result<usize> {
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(service_error(
                "InvalidParameterException",
                format!("limit must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        Ok(limit as usize)
    }

    /// Slice the sorted `keys` into one page after `cursor`.
    fn page_keys<'a>(
        keys: &'a [String],
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> (&'a [String], Option<Cursor>) {
        let start = match cursor {
            Some(cursor) => keys.partition_point(|k| k.as_str() <= cursor.as_str()),
            None => 0,
        };
        let end = (start + limit).min(keys.len());
        let page = &keys[start..end];

        let next = if end < keys.len() {
            page.last().map(|k| Cursor::new(k.clone()))
        } else {
            None
        };

        (page, next)
    }

    // ========================================================================
    // Pool Management
    // ========================================================================

    #[instrument(skip(self))]
    pub fn create_pool(&self, name: &str) -> Result<Pool> {
        let uuid_str = Uuid::new_v4().simple().to_string();
        let id = PoolId::new(format!("local_{}", &uuid_str[..24]))?;

        let stored = StoredPool {
            id: id.clone(),
            name: name.to_string(),
            creation_date: Utc::now().to_rfc3339(),
        };

        Self::write_json(&self.pool_path(&id), &stored)?;
        fs::create_dir_all(self.users_dir(&id)).map_err(map_io)?;

        debug!(pool = %id, name, "Created local pool");

        Ok(Pool {
            id,
            name: name.to_string(),
        })
    }

    fn pool_ids(&self) -> Result<Vec<String>> {
        let dir = self.pools_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<String> = fs::read_dir(&dir)
            .map_err(map_io)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().join("pool.json").exists())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();

        ids.sort();
        Ok(ids)
    }

    pub fn list_pools(&self, limit: u32, cursor: Option<&Cursor>) -> Result<Page<Pool>> {
        let limit = Self::check_limit(limit)?;
        let ids = self.pool_ids()?;
        let (page, next) = Self::page_keys(&ids, limit, cursor);

        let items = page
            .iter()
            .map(|id| {
                let id = PoolId::new(id.as_str())?;
                let stored: StoredPool = Self::read_json(&self.pool_path(&id))?;
                Ok(Pool {
                    id: stored.id,
                    name: stored.name,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            cursor: next,
        })
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    fn usernames(&self, pool: &PoolId) -> Result<Vec<String>> {
        let dir = self.users_dir(pool);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(&dir)
            .map_err(map_io)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).and_then(key::decode))
            .collect();

        names.sort();
        Ok(names)
    }

    fn read_user(&self, pool: &PoolId, username: &Username) -> Result<Option<StoredUser>> {
        let path = self.user_path(pool, username);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_json(&path).map(Some)
    }

    #[instrument(skip(self))]
    pub fn list_users(
        &self,
        pool: &PoolId,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<Page<UserRecord>> {
        let limit = Self::check_limit(limit)?;
        self.ensure_pool(pool)?;

        let names = self.usernames(pool)?;
        let (page, next) = Self::page_keys(&names, limit, cursor);

        let mut items = Vec::with_capacity(page.len());
        for name in page {
            let username = Username::new(name.as_str())?;
            if let Some(user) = self.read_user(pool, &username)? {
                items.push(user.record);
            }
        }

        Ok(Page {
            items,
            cursor: next,
        })
    }

    /// Store `record` as-is, with an optional password hash.
    #[instrument(skip(self, record, password_hash), fields(username = %record.username))]
    pub fn insert_user(
        &self,
        pool: &PoolId,
        record: UserRecord,
        password_hash: Option<String>,
    ) -> Result<()> {
        self.ensure_pool(pool)?;

        let path = self.user_path(pool, &record.username);
        if path.exists() {
            return Err(service_error(
                USERNAME_EXISTS,
                format!("User account {} already exists.", record.username),
            ));
        }

        let stored = StoredUser {
            record,
            password_hash,
        };
        Self::write_json(&path, &stored)?;

        debug!("Stored local user");
        Ok(())
    }

    pub fn password_hash(&self, pool: &PoolId, username: &Username) -> Result<Option<String>> {
        Ok(self
            .read_user(pool, username)?
            .and_then(|user| user.password_hash))
    }
}
