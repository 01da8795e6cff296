//! Token backend
//!
//! Wraps `TokenConfig` and exposes the four token operations used by the
//! login flow and the request extractors.

use std::sync::Arc;

use chrono::Utc;

use crate::claims::{TokenKind, UserClaims};
use crate::config::TokenConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::{issue_token, verify_token, IssuedToken};

/// Token issuance and verification backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthBackend {
    config: Arc<TokenConfig>,
}

impl AuthBackend {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[mutants::skip] // Plain accessor
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn issue_access_token(&self, claims: &UserClaims) -> Result<IssuedToken, AuthError> {
        issue_token(claims, TokenKind::Access, &self.config.access, Utc::now())
    }

    pub fn issue_refresh_token(&self, claims: &UserClaims) -> Result<IssuedToken, AuthError> {
        issue_token(claims, TokenKind::Refresh, &self.config.refresh, Utc::now())
    }

    pub fn verify_access_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        verify_token(token, TokenKind::Access, &self.config.access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        verify_token(token, TokenKind::Refresh, &self.config.refresh)
    }

    /// Shared bearer authentication used by the extractors
    pub(crate) fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = self.verify_access_token(token)?;
        Ok(AuthContext::new(claims))
    }
}
