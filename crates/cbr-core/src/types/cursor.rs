//! Pagination cursor type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque continuation token returned by a paged listing call.
///
/// A page carrying `Some(cursor)` has a successor; `None` ends the
/// traversal. Cursors are never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token returned by the service.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Convert an optional raw token into a cursor.
    ///
    /// Empty tokens are treated as absent, since some services signal the
    /// last page with `""` instead of omitting the field.
    pub fn from_token(token: Option<String>) -> Option<Self> {
        token.filter(|t| !t.is_empty()).map(Self)
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
