//! Identity-service endpoint type.

use std::fmt;
use std::path::PathBuf;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated identity-service endpoint.
///
/// This type supports both network endpoints (HTTPS/HTTP) and local
/// directory endpoints (`file://`).
///
/// # Network URLs
///
/// Network URLs must use HTTPS (or HTTP for localhost, which is how local
/// emulators and signing proxies are usually exposed). Requests to such an
/// endpoint are not signed.
///
/// # File URLs
///
/// File URLs (`file:///path/to/directory`) select the filesystem-backed
/// directory, which needs no network service at all.
///
/// # Example
///
/// ```
/// use cbr_core::Endpoint;
///
/// let emulator = Endpoint::new("http://localhost:9229").unwrap();
/// assert_eq!(emulator.host(), Some("localhost"));
///
/// let local = Endpoint::new("file:///tmp/pools").unwrap();
/// assert!(local.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint(Url);

impl Endpoint {
    /// Create a new endpoint from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::Endpoint {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns true if this is a local directory (file:// URL).
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// Returns the filesystem path for file:// URLs.
    ///
    /// Returns `None` for network URLs.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.is_local() {
            self.0.to_file_path().ok()
        } else {
            None
        }
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::Endpoint {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();

        if scheme == "file" {
            if url.path().is_empty() || url.path() == "/" {
                return Err(InvalidInputError::Endpoint {
                    value: original.to_string(),
                    reason: "file:// URL must have a path".to_string(),
                }
                .into());
            }
            return Ok(());
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::Endpoint {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::Endpoint {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
