//! cbr-aws - Signed identity service client.
//!
//! Talks to the hosted user-pool service through the official SDK, which
//! resolves credentials from the usual chain (environment, shared profile,
//! instance role) and signs every request.

mod convert;
mod service;

pub use service::SdkIdentityService;
