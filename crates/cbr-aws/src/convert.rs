//! Conversions between SDK shapes and directory types.

use aws_sdk_cognitoidentityprovider::config::http::HttpResponse;
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::primitives::{DateTime, DateTimeFormat};
use aws_sdk_cognitoidentityprovider::types::{AttributeType, UserPoolDescriptionType, UserType};
use serde_json::{Value, json};

use cbr_core::directory::{ENABLED, USER_CREATE_DATE, USER_LAST_MODIFIED_DATE, USER_STATUS};
use cbr_core::error::{Error, InvalidInputError, ServiceError, TransportError};
use cbr_core::{Attribute, Pool, PoolId, Result, UserRecord, Username};

/// Listing field holding the legacy MFA settings.
const MFA_OPTIONS: &str = "MFAOptions";

pub(crate) fn pool(description: &UserPoolDescriptionType) -> Result<Pool> {
    let id = PoolId::new(description.id().unwrap_or_default())?;
    let name = description
        .name()
        .map_or_else(|| id.as_str().to_string(), str::to_string);
    Ok(Pool { id, name })
}

/// Rebuild the listing entry of `user` in the service's JSON field names.
pub(crate) fn record(user: &UserType) -> Result<UserRecord> {
    let username = Username::new(user.username().unwrap_or_default())?;
    let attributes = user
        .attributes()
        .iter()
        .map(|a| Attribute {
            name: a.name().to_string(),
            value: a.value().map(str::to_string),
        })
        .collect();

    let mut record = UserRecord::new(username, attributes);
    if let Some(date) = user.user_create_date().and_then(timestamp) {
        record.set_field(USER_CREATE_DATE, date);
    }
    if let Some(date) = user.user_last_modified_date().and_then(timestamp) {
        record.set_field(USER_LAST_MODIFIED_DATE, date);
    }
    record.set_field(ENABLED, user.enabled());
    if let Some(status) = user.user_status() {
        record.set_field(USER_STATUS, status.as_str());
    }

    let mfa: Vec<Value> = user
        .mfa_options()
        .iter()
        .map(|option| {
            json!({
                "DeliveryMedium": option.delivery_medium().map(|m| m.as_str()),
                "AttributeName": option.attribute_name(),
            })
        })
        .collect();
    if !mfa.is_empty() {
        record.set_field(MFA_OPTIONS, mfa);
    }

    Ok(record)
}

fn timestamp(date: &DateTime) -> Option<Value> {
    date.fmt(DateTimeFormat::DateTime).ok().map(Value::String)
}

pub(crate) fn attribute(attribute: &Attribute) -> Result<AttributeType> {
    AttributeType::builder()
        .name(&attribute.name)
        .set_value(attribute.value.clone())
        .build()
        .map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("attribute '{}': {}", attribute.name, e),
            })
        })
}

/// Map an SDK failure onto the shared error taxonomy.
///
/// The SDK has already retried throttled calls by the time this runs.
pub(crate) fn sdk_error<E>(err: SdkError<E, HttpResponse>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(context) => Error::Service(ServiceError::new(
            context.raw().status().as_u16(),
            context.err().code().map(str::to_string),
            context.err().message().map(str::to_string),
        )),
        SdkError::TimeoutError(_) => Error::Transport(TransportError::Timeout),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            Error::Transport(TransportError::Timeout)
        }
        SdkError::DispatchFailure(_) => Error::Transport(TransportError::Connection {
            message: DisplayErrorContext(&err).to_string(),
        }),
        _ => Error::Transport(TransportError::Http {
            message: DisplayErrorContext(&err).to_string(),
        }),
    }
}
