//! Pool selector type.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::types::PoolId;

/// The spelling of the wildcard selector.
pub const ALL: &str = "all";

/// Selects which pools an operation runs against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolSelector {
    /// Every pool in the account/region.
    All,
    /// A single pool.
    Pool(PoolId),
}

impl PoolSelector {
    /// Parse a selector; `all` (any case) is the wildcard.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.eq_ignore_ascii_case(ALL) {
            Ok(Self::All)
        } else {
            Ok(Self::Pool(PoolId::new(s)?))
        }
    }

    /// Returns true for the wildcard.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for PoolSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{}", ALL),
            Self::Pool(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for PoolSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_is_case_insensitive() {
        assert!(PoolSelector::parse("all").unwrap().is_all());
        assert!(PoolSelector::parse("ALL").unwrap().is_all());
    }

    #[test]
    fn concrete_id_passes_through() {
        let selector = PoolSelector::parse("us-east-1_abc").unwrap();
        assert_eq!(
            selector,
            PoolSelector::Pool(PoolId::new("us-east-1_abc").unwrap())
        );
    }

    #[test]
    fn invalid_id_rejected() {
        assert!(PoolSelector::parse("not a pool").is_err());
    }
}
