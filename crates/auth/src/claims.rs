//! JWT claims types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Role;

/// Identity embedded in both access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Which secret and lifetime a token was issued with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Signed JWT payload
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TokenClaims {
    #[serde(flatten)]
    pub identity: UserClaims,
    /// Token kind
    pub typ: TokenKind,
    /// Unique token ID, keeps tokens minted in the same second distinct
    pub jti: Uuid,
    /// Issued at
    pub iat: i64,
    /// Expires at
    pub exp: i64,
}
