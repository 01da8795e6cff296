//! Domain entities for the users domain
//!
//! Constructors enforce invariants and fail with `Error::Domain`.

use atlas_auth::{Role, UserClaims};
use atlas_common::{Error, Result, StateError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::state::{RefreshTokenEvent, RefreshTokenState, RefreshTokenStateMachine};

/// Minimum display name length
pub const MIN_NAME_LEN: usize = 2;

/// Minimum refresh token string length
pub const MIN_TOKEN_LEN: usize = 10;

fn validate_email(email: &str) -> Result<()> {
    if !email.contains('@') || !email.validate_email() {
        return Err(Error::Domain("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(Error::Domain(format!(
            "Name must be at least {} characters",
            MIN_NAME_LEN
        )));
    }
    Ok(())
}

/// User account
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user with validation
    pub fn new(email: String, name: String, password_hash: String, role: Role) -> Result<Self> {
        validate_email(&email)?;
        validate_name(&name)?;

        let now = Utc::now();
        Ok(User {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Identity embedded in issued tokens
    pub fn claims(&self) -> UserClaims {
        UserClaims {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn update_email(&mut self, email: String) -> Result<()> {
        validate_email(&email)?;
        self.email = email;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn update_name(&mut self, name: String) -> Result<()> {
        validate_name(&name)?;
        self.name = name;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

/// Persisted refresh token record
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Create a new active record
    pub fn new(token: String, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<Self> {
        Self::new_at(token, user_id, expires_at, Utc::now())
    }

    /// Create a new active record, checking expiry against `now`
    pub fn new_at(
        token: String,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if token.chars().count() < MIN_TOKEN_LEN {
            return Err(Error::Domain("Invalid token".to_string()));
        }
        if expires_at <= now {
            return Err(Error::Domain("Token is expired".to_string()));
        }

        Ok(RefreshToken {
            id: Uuid::new_v4(),
            token,
            user_id,
            expires_at,
            is_revoked: false,
            created_at: now,
        })
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        RefreshTokenState::derive(self.is_revoked, self.expires_at, now)
    }

    #[mutants::skip] // Delegates to state_at() with the current time
    pub fn state(&self) -> RefreshTokenState {
        self.state_at(Utc::now())
    }

    /// Not revoked and not yet expired at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && self.expires_at > now
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Revoke an active or expired token. One-way.
    pub fn revoke(&mut self) -> std::result::Result<(), StateError> {
        let next = RefreshTokenStateMachine::transition(self.state(), RefreshTokenEvent::Revoke)?;
        self.is_revoked = next == RefreshTokenState::Revoked;
        Ok(())
    }
}
