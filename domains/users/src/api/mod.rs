//! API layer for the users domain
//!
//! Contains HTTP handlers, routes, response strategies and domain state.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod strategies;

pub use middleware::UsersState;
pub use routes::routes;
pub use strategies::ResponseStrategy;
