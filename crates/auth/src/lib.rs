//! Token lifecycle for the Atlas API
//!
//! Issues and verifies access and refresh JWTs, and provides axum
//! extractors that work with any domain state implementing `FromRef<S>`
//! for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod types;

pub use backend::AuthBackend;
pub use claims::{TokenKind, UserClaims};
pub use config::{TokenConfig, TokenSettings};
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AdminUser, AuthUser};
pub use jwt::{issue_token, verify_token, IssuedToken};
pub use types::Role;
