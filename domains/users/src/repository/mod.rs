//! Repository layer for the users domain
//!
//! Services depend on the traits below. `PgUserRepository` and
//! `PgRefreshTokenRepository` back production; the in-memory pair backs
//! tests and local runs without a database.

pub mod memory;
pub mod refresh_tokens;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use atlas_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{RefreshToken, User};

pub use memory::{InMemoryRefreshTokenRepository, InMemoryUserRepository};
pub use refresh_tokens::PgRefreshTokenRepository;
pub use users::PgUserRepository;

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a user. Duplicate emails fail with `Error::Conflict`.
    async fn create(&self, user: &User) -> Result<User>;
}

/// Refresh token persistence
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn save(&self, token: &RefreshToken) -> Result<RefreshToken>;

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>>;

    /// Persist the mutable fields of an existing record
    async fn update(&self, token: &RefreshToken) -> Result<RefreshToken>;

    /// Revoke every unrevoked token for a user, returning how many changed
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64>;
}

/// Combined repository access for the users domain
#[derive(Clone)]
pub struct UsersRepositories {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl UsersRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            refresh_tokens: Arc::new(PgRefreshTokenRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            refresh_tokens: Arc::new(InMemoryRefreshTokenRepository::new()),
        }
    }
}
