//! Service operation names and request/response types.

use serde::{Deserialize, Serialize};

use cbr_core::{Attribute, MessageAction, UserRecord};

// ============================================================================
// Operation Names
// ============================================================================

/// Prefix of the `X-Amz-Target` header value.
pub const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// ListUserPools
pub const LIST_USER_POOLS: &str = "ListUserPools";

/// ListUsers
pub const LIST_USERS: &str = "ListUsers";

/// AdminCreateUser
pub const ADMIN_CREATE_USER: &str = "AdminCreateUser";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for ListUserPools.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUserPoolsRequest<'a> {
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<&'a str>,
}

/// Response from ListUserPools.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUserPoolsResponse {
    #[serde(default)]
    pub user_pools: Vec<UserPoolDescription>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// A single pool entry from ListUserPools.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPoolDescription {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for ListUsers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUsersRequest<'a> {
    pub user_pool_id: &'a str,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_token: Option<&'a str>,
}

/// Response from ListUsers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUsersResponse {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub pagination_token: Option<String>,
}

/// Request body for AdminCreateUser.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminCreateUserRequest<'a> {
    pub user_pool_id: &'a str,
    pub username: &'a str,
    pub user_attributes: &'a [Attribute],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<&'a str>,
    pub message_action: MessageAction,
}

impl std::fmt::Debug for AdminCreateUserRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCreateUserRequest")
            .field("user_pool_id", &self.user_pool_id)
            .field("username", &self.username)
            .field("temporary_password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Error response format.
///
/// The code field is `__type`; the message is `message` or `Message`
/// depending on the service build.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "__type")]
    pub code: Option<String>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
}
