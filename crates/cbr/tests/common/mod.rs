//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use cbr_core::error::{RESOURCE_NOT_FOUND, ServiceError, THROTTLING, USERNAME_EXISTS};
use cbr_core::{
    Attribute, CreateUserRequest, Cursor, Error, IdentityService, Page, Pool, PoolId, Result,
    UserRecord, Username,
};

/// A recorded service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPools,
    ListUsers(PoolId),
    CreateUser(String),
}

/// In-memory identity service that serves pre-cut pages.
///
/// Cursors are `p<index>` of the next page. Every call is recorded with the
/// (possibly paused) tokio clock time it was made at.
#[derive(Default)]
pub struct ScriptedService {
    pool_pages: Vec<Vec<Pool>>,
    user_pages: HashMap<PoolId, Vec<Vec<UserRecord>>>,
    fail_list_at: HashMap<PoolId, usize>,
    fail_create: HashSet<String>,
    calls: Mutex<Vec<(Call, Instant)>>,
    created: Mutex<Vec<(PoolId, CreateUserRequest)>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pages` from the pool listing.
    pub fn with_pool_pages(mut self, pages: Vec<Vec<Pool>>) -> Self {
        self.pool_pages = pages;
        self
    }

    /// Serve `pages` from the user listing of `pool`.
    pub fn with_user_pages(mut self, pool: &PoolId, pages: Vec<Vec<UserRecord>>) -> Self {
        self.user_pages.insert(pool.clone(), pages);
        self
    }

    /// Fail the user listing of `pool` when page `index` is requested.
    pub fn failing_list_at(mut self, pool: &PoolId, index: usize) -> Self {
        self.fail_list_at.insert(pool.clone(), index);
        self
    }

    /// Fail creation of `username`.
    pub fn failing_create(mut self, username: &str) -> Self {
        self.fail_create.insert(username.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Times of the user listing calls against `pool`.
    pub fn list_times(&self, pool: &PoolId) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == Call::ListUsers(pool.clone()))
            .map(|(_, t)| *t)
            .collect()
    }

    /// Times of the pool listing calls.
    pub fn pool_list_times(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == Call::ListPools)
            .map(|(_, t)| *t)
            .collect()
    }

    /// Times of all create calls.
    pub fn create_times(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| matches!(c, Call::CreateUser(_)))
            .map(|(_, t)| *t)
            .collect()
    }

    /// Successfully created requests, in call order.
    pub fn created(&self) -> Vec<(PoolId, CreateUserRequest)> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }
}

fn page_index(cursor: Option<&Cursor>) -> usize {
    cursor
        .and_then(|c| c.as_str().strip_prefix('p'))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn next_cursor(index: usize, pages: usize) -> Option<Cursor> {
    (index + 1 < pages).then(|| Cursor::new(format!("p{}", index + 1)))
}

fn service_error(code: &str, message: &str) -> Error {
    Error::Service(ServiceError::new(
        400,
        Some(code.to_string()),
        Some(message.to_string()),
    ))
}

#[async_trait]
impl IdentityService for ScriptedService {
    async fn list_pools(&self, _limit: u32, cursor: Option<&Cursor>) -> Result<Page<Pool>> {
        self.record(Call::ListPools);
        let index = page_index(cursor);
        Ok(Page {
            items: self.pool_pages.get(index).cloned().unwrap_or_default(),
            cursor: next_cursor(index, self.pool_pages.len()),
        })
    }

    async fn list_users(
        &self,
        pool: &PoolId,
        _limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<Page<UserRecord>> {
        self.record(Call::ListUsers(pool.clone()));
        let index = page_index(cursor);

        if self.fail_list_at.get(pool) == Some(&index) {
            return Err(service_error(THROTTLING, "Rate exceeded"));
        }

        let pages = self
            .user_pages
            .get(pool)
            .ok_or_else(|| service_error(RESOURCE_NOT_FOUND, "User pool does not exist."))?;

        Ok(Page {
            items: pages.get(index).cloned().unwrap_or_default(),
            cursor: next_cursor(index, pages.len()),
        })
    }

    async fn create_user(&self, pool: &PoolId, request: &CreateUserRequest) -> Result<()> {
        self.record(Call::CreateUser(request.username.to_string()));

        if self.fail_create.contains(request.username.as_str()) {
            return Err(service_error(USERNAME_EXISTS, "User account already exists."));
        }

        self.created
            .lock()
            .unwrap()
            .push((pool.clone(), request.clone()));
        Ok(())
    }
}

pub fn pool(id: &str) -> PoolId {
    PoolId::new(id).unwrap()
}

pub fn user(name: &str) -> UserRecord {
    let mut record = UserRecord::new(
        Username::new(name).unwrap(),
        vec![
            Attribute::new("sub", format!("sub-{}", name)),
            Attribute::new("email", format!("{}@example.com", name)),
        ],
    );
    record.set_field("UserStatus", "CONFIRMED");
    record.set_field("Enabled", true);
    record
}

/// `count` users named `<prefix>000`, `<prefix>001`, ...
pub fn users(prefix: &str, count: usize) -> Vec<UserRecord> {
    (0..count).map(|i| user(&format!("{}{:03}", prefix, i))).collect()
}

/// Cut `users` into pages of `size`. An empty input is one empty page.
pub fn pages(users: Vec<UserRecord>, size: usize) -> Vec<Vec<UserRecord>> {
    if users.is_empty() {
        return vec![Vec::new()];
    }
    users.chunks(size).map(<[UserRecord]>::to_vec).collect()
}

pub fn usernames(records: &[UserRecord]) -> Vec<String> {
    records.iter().map(|r| r.username.to_string()).collect()
}
