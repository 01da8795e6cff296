//! Users domain: accounts, credentials and refresh token sessions

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

pub use domain::entities::{RefreshToken, User};
pub use domain::state::{RefreshTokenEvent, RefreshTokenState, RefreshTokenStateMachine};
pub use repository::{RefreshTokenRepository, UserRepository, UsersRepositories};
pub use service::{AuthService, LoginResult, UserService};
