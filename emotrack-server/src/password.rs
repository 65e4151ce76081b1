//! Argon2 password hashing, run on the blocking pool

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{ApiError, ApiResult};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password into a PHC string with a fresh salt
pub async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || {
        hash_blocking(&password)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Task join error: {e}")))?
}

/// Placeholder hash for logins that name an unknown email.
///
/// Verifying against it costs the same Argon2 work as a wrong password for a
/// real account; the outcome is discarded.
pub fn unknown_account_hash() -> Result<String, password_hash::Error> {
    hash_blocking("unknown-account-placeholder")
}

fn hash_blocking(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Check a password against a stored PHC string
pub async fn verify_password(password: String, stored_hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| ApiError::Internal(format!("stored hash unreadable: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Task join error: {e}")))?
}
