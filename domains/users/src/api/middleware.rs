//! Users domain state and auth backend integration

use atlas_auth::AuthBackend;
use atlas_common::{AddressSource, RateLimiter};
use axum::extract::FromRef;

use crate::repository::UsersRepositories;
use crate::service::{AuthService, UserService};

/// Application state for the users domain
#[derive(Clone)]
pub struct UsersState {
    pub repos: UsersRepositories,
    pub auth: AuthBackend,
    /// Stricter limiter for register and login
    pub auth_limiter: RateLimiter,
    pub address_source: AddressSource,
}

impl UsersState {
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(&self.repos, self.auth.clone())
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(&self.repos)
    }
}

impl FromRef<UsersState> for AuthBackend {
    fn from_ref(state: &UsersState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<UsersState> for AddressSource {
    fn from_ref(state: &UsersState) -> Self {
        state.address_source
    }
}
