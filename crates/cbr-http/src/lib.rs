//! cbr-http - HTTP-backed identity service client.

mod client;
mod endpoints;
mod service;

pub use client::{ApiClient, RetryPolicy};
pub use service::HttpIdentityService;
