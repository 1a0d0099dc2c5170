//! Listing types.

use serde::{Deserialize, Serialize};

use crate::types::{Cursor, PoolId};

/// A user pool (a managed identity directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pool {
    /// The pool identifier.
    pub id: PoolId,

    /// The display name. Pools selected by id carry their id here.
    pub name: String,
}

impl Pool {
    /// A pool known only by its identifier.
    pub fn from_id(id: PoolId) -> Self {
        let name = id.as_str().to_string();
        Self { id, name }
    }
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page, in service order.
    pub items: Vec<T>,

    /// Cursor for the next page, if more items exist.
    pub cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Returns true if another page follows this one.
    pub fn has_next(&self) -> bool {
        self.cursor.is_some()
    }
}
