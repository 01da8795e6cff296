//! PostgreSQL refresh token repository

use async_trait::async_trait;
use atlas_common::{RepositoryError, Result};
use sqlx::PgPool;
use uuid::Uuid;

use super::RefreshTokenRepository;
use crate::domain::entities::RefreshToken;

#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn save(&self, token: &RefreshToken) -> Result<RefreshToken> {
        let saved = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (id, token, user_id, expires_at, is_revoked, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, token, user_id, expires_at, is_revoked, created_at
            "#,
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.is_revoked)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        Ok(saved)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let found = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, token, user_id, expires_at, is_revoked, created_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    async fn update(&self, token: &RefreshToken) -> Result<RefreshToken> {
        let updated = sqlx::query_as::<_, RefreshToken>(
            r#"
            UPDATE refresh_tokens SET
                is_revoked = $2,
                expires_at = $3
            WHERE id = $1
            RETURNING id, token, user_id, expires_at, is_revoked, created_at
            "#,
        )
        .bind(token.id)
        .bind(token.is_revoked)
        .bind(token.expires_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(updated)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens SET is_revoked = TRUE
            WHERE user_id = $1 AND is_revoked = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
