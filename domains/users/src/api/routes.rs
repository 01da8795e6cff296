//! Route definitions for the users domain API
//!
//! Paths are relative; the application nests this router under each API
//! mount (`/api/v1`, `/api/v2`, `/api`).

use atlas_common::rate_limit::enforce_rate_limit;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{auth, health, users};
use super::middleware::UsersState;

/// Create auth routes. Register and login sit behind the auth limiter.
fn auth_routes(state: &UsersState) -> Router<UsersState> {
    let credential_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.auth_limiter.clone(),
            enforce_rate_limit,
        ));

    Router::new()
        .merge(credential_routes)
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/logout-all", post(auth::logout_all))
}

/// Create user management routes
fn user_routes() -> Router<UsersState> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/users/{id}", get(users::get_user))
}

/// Create all users domain API routes
pub fn routes(state: &UsersState) -> Router<UsersState> {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health))
        .merge(auth_routes(state))
        .merge(user_routes())
}
