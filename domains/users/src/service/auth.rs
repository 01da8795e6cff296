//! Registration, login and refresh token lifecycle

use std::sync::Arc;

use atlas_auth::{AuthBackend, Role, UserClaims};
use atlas_common::{hash_password, verify_password, Error, Result};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use uuid::Uuid;

use crate::domain::entities::{RefreshToken, User};
use crate::repository::{RefreshTokenRepository, UserRepository, UsersRepositories};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";

lazy_static! {
    /// Compared against when the email is unknown so both failure paths hash once
    static ref DUMMY_PASSWORD_HASH: String =
        hash_password("atlas-dummy-password").unwrap_or_default();
}

/// Registration payload after request validation
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    /// Configured access token lifetime, e.g. `7d`
    pub expires_in: String,
    pub issued_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user: User,
}

/// Auth use cases over the user and refresh token repositories
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    backend: AuthBackend,
}

impl AuthService {
    pub fn new(repos: &UsersRepositories, backend: AuthBackend) -> Self {
        Self {
            users: repos.users.clone(),
            refresh_tokens: repos.refresh_tokens.clone(),
            backend,
        }
    }

    /// Create an account with role `user`
    pub async fn register(&self, input: RegisterInput) -> Result<User> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let user = User::new(
            input.email,
            input.name,
            hash_password(&input.password)?,
            Role::User,
        )?;
        let user = self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a token pair.
    ///
    /// Unknown email, wrong password and a deactivated account are
    /// indistinguishable to the caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
    ) -> Result<LoginResult> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                let _ = verify_password(password, &DUMMY_PASSWORD_HASH);
                tracing::debug!("Login failed: unknown email");
                return Err(Error::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(Error::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "Login failed: account inactive");
            return Err(Error::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let claims = user.claims();
        let access = self.backend.issue_access_token(&claims)?;
        let refresh = self.backend.issue_refresh_token(&claims)?;
        self.persist_refresh_token(&claims, &refresh.token).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginResult {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: self.backend.config().access.expires_in.clone(),
            issued_at: access.issued_at,
            ip_address,
            user,
        })
    }

    /// Store an issued refresh token so it can be looked up and revoked
    pub async fn persist_refresh_token(
        &self,
        claims: &UserClaims,
        token: &str,
    ) -> Result<RefreshToken> {
        let expires_at = Utc::now()
            .checked_add_signed(self.backend.config().refresh.lifetime)
            .ok_or_else(|| Error::Internal("Refresh token expiry out of range".to_string()))?;
        let record = RefreshToken::new(token.to_string(), claims.id, expires_at)?;
        self.refresh_tokens.save(&record).await
    }

    /// Exchange a valid refresh token for a new access token. No rotation.
    pub async fn refresh(&self, token: &str) -> Result<String> {
        let claims = self.backend.verify_refresh_token(token)?;

        let record = self.valid_record(token).await?;
        if record.user_id != claims.id {
            return Err(Error::Authentication(INVALID_REFRESH_TOKEN.to_string()));
        }

        let access = self.backend.issue_access_token(&claims)?;
        tracing::info!(user_id = %claims.id, "Access token refreshed");
        Ok(access.token)
    }

    /// Revoke one refresh token. Revoking an already revoked token succeeds.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        let claims = self.backend.verify_refresh_token(token)?;

        let mut record = self
            .refresh_tokens
            .find_by_token(token)
            .await?
            .ok_or_else(|| Error::Authentication(INVALID_REFRESH_TOKEN.to_string()))?;

        if record.is_revoked {
            tracing::debug!(user_id = %claims.id, "Refresh token already revoked");
            return Ok(());
        }

        record.revoke()?;
        self.refresh_tokens.update(&record).await?;

        tracing::info!(user_id = %claims.id, "Refresh token revoked");
        Ok(())
    }

    /// Revoke every refresh token belonging to a user
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64> {
        let revoked = self.refresh_tokens.revoke_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "All refresh tokens revoked");
        Ok(revoked)
    }

    async fn valid_record(&self, token: &str) -> Result<RefreshToken> {
        match self.refresh_tokens.find_by_token(token).await? {
            Some(record) if record.is_valid() => Ok(record),
            _ => {
                tracing::debug!("Refresh rejected: unknown, revoked or expired token");
                Err(Error::Authentication(INVALID_REFRESH_TOKEN.to_string()))
            }
        }
    }
}
