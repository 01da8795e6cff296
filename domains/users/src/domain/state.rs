//! Refresh token state machine
//!
//! Only revocation is stored. Expiry is derived from `expires_at` each time
//! the state is read, so there is no background sweep. An expired token can
//! still be revoked; only Revoked is terminal.

use atlas_common::StateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Refresh token lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

impl RefreshTokenState {
    /// Derive the state from stored fields. Revocation wins over expiry.
    pub fn derive(is_revoked: bool, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if is_revoked {
            Self::Revoked
        } else if expires_at <= now {
            Self::Expired
        } else {
            Self::Active
        }
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [RefreshTokenState] {
        match self {
            Self::Active => &[Self::Revoked],
            Self::Revoked => &[],
            Self::Expired => &[Self::Revoked],
        }
    }
}

impl std::fmt::Display for RefreshTokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Revoked => write!(f, "revoked"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Events that trigger refresh token state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefreshTokenEvent {
    /// Explicit logout or session revocation
    Revoke,
}

impl std::fmt::Display for RefreshTokenEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Revoke => write!(f, "revoke"),
        }
    }
}

/// Refresh token state machine
pub struct RefreshTokenStateMachine;

impl RefreshTokenStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: RefreshTokenState,
        event: RefreshTokenEvent,
    ) -> Result<RefreshTokenState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (
                RefreshTokenState::Active | RefreshTokenState::Expired,
                RefreshTokenEvent::Revoke,
            ) => Ok(RefreshTokenState::Revoked),
            (from, event) => Err(StateError::InvalidTransition {
                from: from.to_string(),
                event: event.to_string(),
            }),
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: RefreshTokenState, event: RefreshTokenEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
