//! User management API handlers
//!
//! Implements:
//! - POST /users: Create a user (admin only)
//! - GET /users/{id}: Fetch a user (authenticated)

use atlas_auth::{AdminUser, AuthUser, Role};
use atlas_common::{ApiResponse, ApiVersion, Error, Result, ValidatedJson};
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::UsersState;
use crate::api::strategies::{ResponseStrategy, UserBody};
use crate::service::CreateUserInput;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<Role>,
}

/// POST /users
pub async fn create_user(
    State(state): State<UsersState>,
    version: ApiVersion,
    AdminUser(admin): AdminUser,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<ApiResponse<UserBody>> {
    let user = state
        .user_service()
        .create_user(CreateUserInput {
            email: request.email,
            name: request.name,
            password: request.password,
            role: request.role.unwrap_or_default(),
        })
        .await?;

    tracing::debug!(admin_id = %admin.user_id(), user_id = %user.id, "Admin created user");
    let body = ResponseStrategy::select(&version).user(&user)?;
    Ok(ApiResponse::created(body, version).with_message("User created successfully"))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<UsersState>,
    version: ApiVersion,
    AuthUser(_auth_context): AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<UserBody>> {
    let id = Uuid::parse_str(&id).map_err(|_| Error::NotFound("User not found".to_string()))?;

    let user = state.user_service().get_user(id).await?;

    let body = ResponseStrategy::select(&version).user(&user)?;
    Ok(ApiResponse::ok(body, version))
}
