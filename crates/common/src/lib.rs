//! Shared utilities, configuration, and error handling for Atlas
//!
//! This crate provides common functionality used across the Atlas API:
//! - Configuration management following 12-factor principles
//! - Error types and the JSON error body
//! - Password hashing
//! - API version negotiation and the success envelope
//! - Request validation and rate limiting

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;
pub mod rate_limit;
pub mod response;
pub mod state;
pub mod version;

pub use crypto::{hash_password, verify_password};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
pub use rate_limit::{AddressSource, ClientAddress, RateLimitConfig, RateLimiter};
pub use response::ApiResponse;
pub use state::StateError;
pub use version::ApiVersion;
