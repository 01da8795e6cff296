//! Authentication errors

use atlas_common::Error;
use axum::response::{IntoResponse, Response};

/// Authentication error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingAuthorization,
    InvalidAuthorizationFormat,
    InvalidToken,
    InvalidRefreshToken,
    InsufficientRole,
    TokenIssueFailed,
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthorization => {
                Error::Authentication("No authentication token provided".to_string())
            }
            AuthError::InvalidAuthorizationFormat => {
                Error::Authentication("Invalid authorization header format".to_string())
            }
            AuthError::InvalidToken => Error::Authentication("Invalid or expired token".to_string()),
            AuthError::InvalidRefreshToken => {
                Error::Authentication("Invalid or expired refresh token".to_string())
            }
            AuthError::InsufficientRole => {
                Error::Authorization("Insufficient permissions".to_string())
            }
            AuthError::TokenIssueFailed => Error::Internal("Failed to issue token".to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        Error::from(self).into_response()
    }
}
