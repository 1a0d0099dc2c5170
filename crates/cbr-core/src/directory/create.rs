//! User creation request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Attribute, UserRecord};
use crate::types::Username;

/// What the service should do about the invitation message of a new user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageAction {
    /// Do not send an invitation. Restored accounts use this.
    Suppress,
}

/// Parameters for creating one user in a target pool.
///
/// The temporary password is never shown in `Debug` output.
#[derive(Clone)]
pub struct CreateUserRequest {
    /// The username.
    pub username: Username,
    /// Attributes to set on the new user.
    pub attributes: Vec<Attribute>,
    /// Initial (temporary) credential. `None` lets the service generate one.
    pub temporary_password: Option<String>,
    /// Invitation behavior.
    pub message_action: MessageAction,
}

impl CreateUserRequest {
    /// Build the request that re-creates `record`.
    ///
    /// Server-assigned attributes and fields (timestamps, status, enabled
    /// flag) are left out; the target service regenerates them.
    pub fn from_record(record: &UserRecord, temporary_password: Option<String>) -> Self {
        Self {
            username: record.username.clone(),
            attributes: record.writable_attributes(),
            temporary_password,
            message_action: MessageAction::Suppress,
        }
    }
}

impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("attributes", &self.attributes)
            .field("temporary_password", &"[REDACTED]")
            .field("message_action", &self.message_action)
            .finish()
    }
}
