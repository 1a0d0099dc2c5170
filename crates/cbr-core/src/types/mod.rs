//! Core identity-directory types.
//!
//! These types enforce their invariants at construction time,
//! so invalid identifiers never reach a remote call.

mod cursor;
mod endpoint;
mod pool_id;
mod selector;
mod username;

pub use cursor::Cursor;
pub use endpoint::Endpoint;
pub use pool_id::PoolId;
pub use selector::PoolSelector;
pub use username::Username;
