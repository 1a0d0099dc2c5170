//! Pool identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Maximum length of a pool identifier accepted by the service.
const MAX_LEN: usize = 55;

/// A validated user-pool identifier (e.g. `eu-west-1_aBcDeF123`).
///
/// The identifier is opaque to the pipeline; only its character set and
/// length are checked.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PoolId(String);

impl PoolId {
    /// Create a new pool id, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, too long, or contains characters
    /// other than ASCII letters, digits, `-` and `_`.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let reason = if s.is_empty() {
            Some("must be non-empty")
        } else if s.len() > MAX_LEN {
            Some("must be at most 55 characters")
        } else if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            Some("may only contain letters, digits, '-' and '_'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidInputError::PoolId {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PoolId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PoolId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PoolId> for String {
    fn from(id: PoolId) -> Self {
        id.0
    }
}

impl AsRef<str> for PoolId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
