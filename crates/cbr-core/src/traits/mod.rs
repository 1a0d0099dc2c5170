//! Core traits for identity-service behavior.

mod service;

pub use service::IdentityService;
