//! JWT issuance, validation and token extraction helpers
//!
//! Signing and verification take their secret and lifetime explicitly, so
//! nothing here reads global state.

use axum::http::HeaderValue;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::claims::{TokenClaims, TokenKind, UserClaims};
use crate::config::TokenSettings;
use crate::error::AuthError;

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

fn rejection(kind: TokenKind) -> AuthError {
    match kind {
        TokenKind::Access => AuthError::InvalidToken,
        TokenKind::Refresh => AuthError::InvalidRefreshToken,
    }
}

/// Sign `claims` as a token of `kind`, valid from `now` for the configured lifetime
pub fn issue_token(
    claims: &UserClaims,
    kind: TokenKind,
    settings: &TokenSettings,
    now: DateTime<Utc>,
) -> Result<IssuedToken, AuthError> {
    let expires_at = now.checked_add_signed(settings.lifetime).ok_or_else(|| {
        tracing::error!(
            token_kind = %kind,
            expires_in = %settings.expires_in,
            "Token expiry out of range"
        );
        AuthError::TokenIssueFailed
    })?;
    let payload = TokenClaims {
        identity: claims.clone(),
        typ: kind,
        jti: Uuid::new_v4(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &payload,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, token_kind = %kind, "Failed to sign token");
        AuthError::TokenIssueFailed
    })?;

    Ok(IssuedToken {
        token,
        issued_at: now,
        expires_at,
    })
}

/// Validate signature, expiry and kind, returning the embedded identity
pub fn verify_token(
    token: &str,
    kind: TokenKind,
    settings: &TokenSettings,
) -> Result<UserClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());

    let token_data = decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, token_kind = %kind, "JWT validation failed");
        rejection(kind)
    })?;

    if token_data.claims.typ != kind {
        tracing::debug!(
            expected = %kind,
            actual = %token_data.claims.typ,
            "JWT kind mismatch"
        );
        return Err(rejection(kind));
    }

    Ok(token_data.claims.identity)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}
