//! HTTP handlers for the users domain

pub mod auth;
pub mod health;
pub mod users;
