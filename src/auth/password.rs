//! Credential validation and Argon2 hashing.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 5;
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Check a username: non-empty, no whitespace, at most 20 chars.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(
            "Username mustn't contain spaces".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Username is too long ({} chars max)",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(())
}

/// Check a password before it is hashed.
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.trim().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "The password must contain at least {} chars",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Raw Argon2 salt length. Argon2 accepts 8 to 48 bytes; the configured
/// salt is folded into this size so any value works.
const SALT_LEN: usize = 16;

fn salt_bytes(salt: &str) -> [u8; SALT_LEN] {
    let bytes = salt.as_bytes();
    let mut out = [0u8; SALT_LEN];
    if bytes.is_empty() {
        return out;
    }
    for i in 0..bytes.len().max(SALT_LEN) {
        let slot = &mut out[i % SALT_LEN];
        *slot = slot.rotate_left(5) ^ bytes[i % bytes.len()].wrapping_add(i as u8);
    }
    out
}

fn hash_unchecked(password: &str, salt: &str) -> Result<String, AppError> {
    let salt = SaltString::encode_b64(&salt_bytes(salt))?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Hash `password` with the process-wide salt into a PHC string.
pub fn hash_password(password: &str, salt: &str) -> Result<String, AppError> {
    validate_password(password)?;
    hash_unchecked(password, salt)
}

/// Stand-in for [`verify_password`] when the username does not exist.
///
/// Spends one Argon2 hash so unknown users cost as much as wrong passwords.
/// Always `Ok(false)`.
pub fn verify_unknown_user(password: &str, salt: &str) -> Result<bool, AppError> {
    hash_unchecked(password, salt)?;
    Ok(false)
}

/// Check `password` against a stored PHC string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
