//! Directory records and request types.
//!
//! This module defines the values exchanged with an identity service.
//! The operations themselves are methods on
//! [`IdentityService`](crate::IdentityService).

mod create;
mod page;
mod user;

pub use create::{CreateUserRequest, MessageAction};
pub use page::{Page, Pool};
pub use user::{
    Attribute, ENABLED, SERVER_ASSIGNED_ATTRIBUTES, USER_CREATE_DATE, USER_LAST_MODIFIED_DATE,
    USER_STATUS, UserRecord,
};
