//! Atlas application composition root
//!
//! Mounts the users domain router under `/api/v1`, `/api/v2` and `/api`,
//! with the API rate limiter on every mount and version resolution around
//! the whole application.

use atlas_auth::{AuthBackend, TokenConfig};
use atlas_common::config::Config;
use atlas_common::rate_limit::enforce_rate_limit;
use atlas_common::version::resolve_version;
use atlas_common::{AddressSource, RateLimiter};
use atlas_users::api::{routes, UsersState};
use atlas_users::{User, UserService, UsersRepositories};
use axum::{middleware, routing::get, Router};
use sqlx::PgPool;

/// Create the application backed by PostgreSQL
pub fn create_app(config: &Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    build_app(config, UsersRepositories::postgres(pool))
}

/// Create the application over the given repositories
pub fn build_app(config: &Config, repos: UsersRepositories) -> Result<Router, anyhow::Error> {
    let token_config = TokenConfig::from_config(config)?;
    let limits_enabled = config.rate_limiting_enabled();
    if !limits_enabled {
        tracing::info!(environment = ?config.environment, "Rate limiting disabled");
    }

    let address_source = AddressSource::from_trust_proxy(config.trust_proxy);
    if config.trust_proxy {
        tracing::info!("Client addresses taken from X-Forwarded-For");
    }

    let state = UsersState {
        repos,
        auth: AuthBackend::new(token_config),
        auth_limiter: RateLimiter::auth()
            .enabled(limits_enabled)
            .address_source(address_source),
        address_source,
    };

    let api = Router::new()
        .nest("/api/v1", routes(&state))
        .nest("/api/v2", routes(&state))
        .nest("/api", routes(&state))
        .layer(middleware::from_fn_with_state(
            RateLimiter::api()
                .enabled(limits_enabled)
                .address_source(address_source),
            enforce_rate_limit,
        ));

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .with_state(state)
        .layer(middleware::from_fn(resolve_version));

    Ok(app)
}

/// Create the configured admin account if it does not exist yet.
///
/// Does nothing unless both `ADMIN_EMAIL` and `ADMIN_PASSWORD` are set.
pub async fn bootstrap_admin(
    config: &Config,
    repos: &UsersRepositories,
) -> Result<Option<User>, anyhow::Error> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        tracing::debug!("No bootstrap admin configured");
        return Ok(None);
    };

    let created = UserService::new(repos)
        .ensure_admin(email.clone(), config.admin_name.clone(), password.clone())
        .await?;
    match &created {
        Some(user) => tracing::info!(user_id = %user.id, "Bootstrap admin created"),
        None => tracing::info!("Bootstrap admin already present"),
    }
    Ok(created)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
