//! cbr-core - Core types and traits for user-pool backup and restore.

pub mod directory;
pub mod error;
pub mod traits;
pub mod types;

pub use directory::{Attribute, CreateUserRequest, MessageAction, Page, Pool, UserRecord};
pub use error::Error;
pub use traits::IdentityService;
pub use types::{Cursor, Endpoint, PoolId, PoolSelector, Username};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
