//! Error types for identity-service clients.
//!
//! This module provides a unified error type with explicit variants for
//! transport, service, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for identity-service operations.
///
/// Every [`IdentityService`](crate::IdentityService) implementation reports
/// failures through this type, so callers can distinguish a dropped
/// connection from a rejected request.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Errors reported by the identity service itself.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Input validation errors (invalid pool id, username, endpoint).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the service error, if this is one.
    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Error::Service(err) => Some(err),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// Local filesystem error (file-backed directories).
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io {
            message: err.to_string(),
        }
    }
}

/// Error code for a throttled request.
pub const TOO_MANY_REQUESTS: &str = "TooManyRequestsException";

/// Alternate error code for a throttled request.
pub const THROTTLING: &str = "ThrottlingException";

/// Error code returned when creating a user whose username is taken.
pub const USERNAME_EXISTS: &str = "UsernameExistsException";

/// Error code returned when the pool does not exist.
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// An error response from the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status code.
    pub status: u16,
    /// Service error code (e.g. `UsernameExistsException`), if present.
    pub code: Option<String>,
    /// Error message from the service.
    pub message: Option<String>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Create a new service error.
    ///
    /// Codes of the form `namespace#Code` are normalised to `Code`.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        let code = code.map(|c| match c.rsplit_once('#') {
            Some((_, short)) => short.to_string(),
            None => c,
        });
        Self {
            status,
            code,
            message,
        }
    }

    /// Check if the request was rejected because of the request-rate ceiling.
    pub fn is_throttling(&self) -> bool {
        self.status == 429
            || self.code.as_deref() == Some(TOO_MANY_REQUESTS)
            || self.code.as_deref() == Some(THROTTLING)
    }

    /// Check if the request failed because the username already exists.
    pub fn is_user_exists(&self) -> bool {
        self.code.as_deref() == Some(USERNAME_EXISTS)
    }

    /// Check if the target resource (usually the pool) does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code.as_deref() == Some(RESOURCE_NOT_FOUND)
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid pool identifier.
    #[error("invalid pool id '{value}': {reason}")]
    PoolId { value: String, reason: String },

    /// Invalid username.
    #[error("invalid username '{value}': {reason}")]
    Username { value: String, reason: String },

    /// Invalid service endpoint.
    #[error("invalid endpoint '{value}': {reason}")]
    Endpoint { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
