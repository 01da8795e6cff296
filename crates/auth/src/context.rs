//! Authorization context for authenticated users

use uuid::Uuid;

use crate::claims::UserClaims;
use crate::types::Role;

/// Represents an authenticated caller
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: UserClaims,
}

impl AuthContext {
    pub fn new(claims: UserClaims) -> Self {
        Self { claims }
    }

    pub fn user_id(&self) -> Uuid {
        self.claims.id
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    /// Check if the caller can manage other accounts
    pub fn is_admin(&self) -> bool {
        self.claims.role.is_admin()
    }
}
