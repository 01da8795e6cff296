//! Auth API handlers
//!
//! Implements:
//! - POST /auth/register: Create an account
//! - POST /auth/login: Exchange credentials for a token pair
//! - POST /auth/refresh: Exchange a refresh token for an access token
//! - POST /auth/logout: Revoke one refresh token
//! - POST /auth/logout-all: Revoke every refresh token of the caller

use atlas_auth::AuthUser;
use atlas_common::{ApiResponse, ApiVersion, ClientAddress, Result, ValidatedJson};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::UsersState;
use crate::api::strategies::{LoginBody, ResponseStrategy, UserBody};
use crate::service::RegisterInput;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body for refresh and logout
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct RevokedResponse {
    pub revoked: u64,
}

/// POST /auth/register
pub async fn register(
    State(state): State<UsersState>,
    version: ApiVersion,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<ApiResponse<UserBody>> {
    let user = state
        .auth_service()
        .register(RegisterInput {
            email: request.email,
            name: request.name,
            password: request.password,
        })
        .await?;

    let body = ResponseStrategy::select(&version).user(&user)?;
    Ok(ApiResponse::created(body, version).with_message("User registered successfully"))
}

/// POST /auth/login
pub async fn login(
    State(state): State<UsersState>,
    version: ApiVersion,
    ClientAddress(ip_address): ClientAddress,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginBody>> {
    let result = state
        .auth_service()
        .login(&request.email, &request.password, ip_address)
        .await?;

    let body = ResponseStrategy::select(&version).login(&result)?;
    Ok(ApiResponse::ok(body, version).with_message("Login successful"))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<UsersState>,
    version: ApiVersion,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<ApiResponse<RefreshResponse>> {
    let access_token = state.auth_service().refresh(&request.refresh_token).await?;

    Ok(ApiResponse::ok(RefreshResponse { access_token }, version))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<UsersState>,
    version: ApiVersion,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<ApiResponse<()>> {
    state.auth_service().revoke(&request.refresh_token).await?;

    Ok(ApiResponse::ok((), version).with_message("Logged out"))
}

/// POST /auth/logout-all
pub async fn logout_all(
    State(state): State<UsersState>,
    version: ApiVersion,
    AuthUser(auth_context): AuthUser,
) -> Result<ApiResponse<RevokedResponse>> {
    let revoked = state
        .auth_service()
        .revoke_all(auth_context.user_id())
        .await?;

    Ok(ApiResponse::ok(RevokedResponse { revoked }, version).with_message("All sessions revoked"))
}
