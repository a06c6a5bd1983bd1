//! Password hashing (Argon2id, PHC strings)

use std::sync::LazyLock;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use shared::error::AppError;

/// Digest verified against when there is no usable stored digest, so that
/// every failed verification costs one full Argon2 computation.
static DUMMY_DIGEST: LazyLock<String> = LazyLock::new(|| {
    hash_password("bookstore-dummy-password").unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build dummy password digest");
        String::new()
    })
});

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify `password` against a stored digest.
///
/// A malformed digest is treated like a wrong password, after doing the same
/// amount of work as a real verification.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => {
            burn_dummy_verification(password);
            false
        }
    }
}

/// Run a verification whose result is discarded (unknown user, bad digest)
pub fn burn_dummy_verification(password: &str) {
    if let Ok(parsed) = PasswordHash::new(DUMMY_DIGEST.as_str()) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
    }
}

/// Hash on the blocking pool
pub async fn hash(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

/// Verify on the blocking pool; `None` digest verifies against the dummy
pub async fn verify(password: String, digest: Option<String>) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || match digest {
        Some(digest) => verify_password(&password, &digest),
        None => {
            burn_dummy_verification(&password);
            false
        }
    })
    .await
    .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
}
