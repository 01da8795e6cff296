//! Application services for the users domain

pub mod auth;
pub mod users;

pub use auth::{AuthService, LoginResult, RegisterInput};
pub use users::{CreateUserInput, UserService};
