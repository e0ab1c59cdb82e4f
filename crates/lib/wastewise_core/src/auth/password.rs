//! Password hashing via bcrypt.
//!
//! bcrypt is CPU bound, so the async variants run it on the blocking pool to
//! keep sibling requests moving.

use std::sync::LazyLock;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash checked when no account matches, so a miss costs one bcrypt verify
/// like a wrong password does.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("wastewise-no-such-account").ok());

/// Hash a password with bcrypt (cost 10, random per-hash salt).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("bcrypt task: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_async(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("bcrypt task: {e}")))?
}

/// Check a login attempt against the stored hash, or against a dummy hash
/// when no account was found. A missing account never verifies.
pub async fn verify_credentials_async(
    password: String,
    hash: Option<String>,
) -> Result<bool, AuthError> {
    match hash {
        Some(hash) => verify_password_async(password, hash).await,
        None => {
            let dummy = DUMMY_HASH
                .clone()
                .ok_or_else(|| AuthError::Internal("bcrypt dummy hash unavailable".into()))?;
            verify_password_async(password, dummy).await?;
            Ok(false)
        }
    }
}
