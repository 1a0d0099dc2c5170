//! Username type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Maximum username length accepted by the service.
const MAX_LEN: usize = 128;

/// A validated username, the restore key of a user record.
///
/// Usernames are non-empty, at most 128 characters, and contain no
/// control characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Create a new username, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();

        let reason = if s.is_empty() {
            Some("must be non-empty")
        } else if s.chars().count() > MAX_LEN {
            Some("must be at most 128 characters")
        } else if s.chars().any(char::is_control) {
            Some("must not contain control characters")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(InvalidInputError::Username {
                value: s,
                reason: reason.to_string(),
            }
            .into());
        }

        Ok(Self(s))
    }

    /// Returns the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Username {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Username {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
