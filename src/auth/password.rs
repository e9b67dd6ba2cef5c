//! Password hashing and verification.
//!
//! Uses Argon2id with a fresh random salt for every digest.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use thiserror::Error;

use crate::GateError;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

impl From<PasswordError> for GateError {
    fn from(e: PasswordError) -> Self {
        GateError::Auth(e.to_string())
    }
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted string carrying the salt and parameters. Two
/// calls with the same input never return the same digest.
///
/// # Examples
///
/// ```
/// use sessiongate::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored digest.
///
/// A malformed digest never matches.
///
/// # Examples
///
/// ```
/// use sessiongate::{hash_password, verify_password};
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(verify_password("my_secure_password", &hash));
/// assert!(!verify_password("wrong_password", &hash));
/// assert!(!verify_password("my_secure_password", "garbage"));
/// ```
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    // Parameters come from the parsed digest, not from Argon2::default().
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
