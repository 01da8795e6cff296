//! Password hashing shared across Atlas crates
//!
//! Passwords are stored as bcrypt hashes. The cost factor is embedded in
//! each stored hash, so raising it only affects newly hashed passwords.

use crate::{Error, Result};

/// bcrypt cost factor for new hashes
pub const PASSWORD_HASH_COST: u32 = 10;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, PASSWORD_HASH_COST)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a candidate password against a stored hash.
///
/// Malformed stored hashes never verify.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(candidate, stored_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            false
        }
    }
}
