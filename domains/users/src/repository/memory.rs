//! In-memory repositories
//!
//! Used by tests and by local runs without PostgreSQL. Uniqueness rules match
//! the database: one user per email, one record per token string.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use atlas_common::{RepositoryError, Result};
use uuid::Uuid;

use super::{RefreshTokenRepository, UserRepository};
use crate::domain::entities::{RefreshToken, User};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory user store keyed by id
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.users).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(lock(&self.users)
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User> {
        let mut users = lock(&self.users);
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::AlreadyExists.into());
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }
}

/// In-memory refresh token store keyed by token string
#[derive(Debug, Clone, Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Arc<Mutex<HashMap<String, RefreshToken>>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record for a user
    pub fn tokens_for_user(&self, user_id: Uuid) -> Vec<RefreshToken> {
        lock(&self.tokens)
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn save(&self, token: &RefreshToken) -> Result<RefreshToken> {
        let mut tokens = lock(&self.tokens);
        if tokens.contains_key(&token.token) {
            return Err(RepositoryError::AlreadyExists.into());
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(token.clone())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        Ok(lock(&self.tokens).get(token).cloned())
    }

    async fn update(&self, token: &RefreshToken) -> Result<RefreshToken> {
        let mut tokens = lock(&self.tokens);
        match tokens.get_mut(&token.token) {
            Some(stored) if stored.id == token.id => {
                stored.is_revoked = token.is_revoked;
                stored.expires_at = token.expires_at;
                Ok(stored.clone())
            }
            _ => Err(RepositoryError::NotFound.into()),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64> {
        let mut tokens = lock(&self.tokens);
        let mut revoked = 0;
        for token in tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && !t.is_revoked)
        {
            token.is_revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}
