//! Users domain layer: entities and the refresh token state machine

pub mod entities;
pub mod state;
