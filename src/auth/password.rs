//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so the algorithm parameters and salt
//! travel with the hash.

use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

/// Hash a clear text password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Check a clear text password against a stored PHC string.
///
/// An unparsable stored hash never verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Stand-in PHC string for logins naming no account, so a miss pays the
/// same Argon2 cost as a wrong password. Hashed once on first use.
pub fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("no account has this password").unwrap_or_default())
}

/// Length policy, counted in characters rather than bytes.
pub fn check_length(password: &str) -> Result<(), String> {
    let count = password.chars().count();
    if password.trim().is_empty() {
        Err("must not be blank".to_string())
    } else if count < MIN_PASSWORD_LENGTH {
        Err(format!("must be at least {} characters", MIN_PASSWORD_LENGTH))
    } else if count > MAX_PASSWORD_LENGTH {
        Err(format!("must be at most {} characters", MAX_PASSWORD_LENGTH))
    } else {
        Ok(())
    }
}
