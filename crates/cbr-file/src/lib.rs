//! cbr-file - Filesystem-backed user directory.
//!
//! Stores pools and users as JSON files under a root directory and serves
//! them through [`IdentityService`](cbr_core::IdentityService) with the same
//! paging rules as the network service.

mod directory;
mod key;
mod store;

pub use directory::FileDirectory;
pub use store::MAX_PAGE_SIZE;
