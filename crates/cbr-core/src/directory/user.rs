//! User record type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Username;

/// Attributes the service assigns itself and rejects on creation.
pub const SERVER_ASSIGNED_ATTRIBUTES: &[&str] = &["sub"];

/// A single `Name`/`Value` attribute of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attribute {
    /// Attribute name (e.g. `email`, `custom:tenant`).
    pub name: String,

    /// Attribute value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Attribute {
    /// Create an attribute with a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Listing field holding the account status.
pub const USER_STATUS: &str = "UserStatus";

/// Listing field holding the enabled flag.
pub const ENABLED: &str = "Enabled";

/// Listing field holding the creation timestamp.
pub const USER_CREATE_DATE: &str = "UserCreateDate";

/// Listing field holding the last modification timestamp.
pub const USER_LAST_MODIFIED_DATE: &str = "UserLastModifiedDate";

/// A directory entry as returned by the user listing.
///
/// Only `Username` and `Attributes` are interpreted. Every other field
/// (timestamps, status, `MFAOptions`, ...) is kept in [`extra`](Self::extra)
/// exactly as the service reported it, explicit `null`s included, so a
/// snapshot mirrors the listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserRecord {
    /// The username, the restore key.
    pub username: Username,

    /// The attribute set in service order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// All other fields of the listing response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// A record with only a username and attributes.
    pub fn new(username: Username, attributes: Vec<Attribute>) -> Self {
        Self {
            username,
            attributes,
            extra: Map::new(),
        }
    }

    /// Set a listing field such as [`USER_STATUS`].
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) {
        self.extra.insert(name.to_string(), value.into());
    }

    /// Returns a listing field as reported.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Account status (e.g. `CONFIRMED`, `FORCE_CHANGE_PASSWORD`).
    pub fn user_status(&self) -> Option<&str> {
        self.field(USER_STATUS).and_then(Value::as_str)
    }

    /// Whether the account is enabled.
    pub fn enabled(&self) -> Option<bool> {
        self.field(ENABLED).and_then(Value::as_bool)
    }

    /// Returns the value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_deref())
    }

    /// The attributes that can be sent back on creation, in record order.
    pub fn writable_attributes(&self) -> Vec<Attribute> {
        self.attributes
            .iter()
            .filter(|a| !SERVER_ASSIGNED_ATTRIBUTES.contains(&a.name.as_str()))
            .cloned()
            .collect()
    }
}
