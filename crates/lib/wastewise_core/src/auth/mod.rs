//! Authentication and authorization.
//!
//! Password hashing, bearer token issuance and verification, the revocation
//! registry, the request authentication gate and the access policy.

pub mod bootstrap;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod revocation;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown account or wrong password. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    CredentialError,

    #[error("No token")]
    MissingToken,

    #[error("Token is blacklisted")]
    Revoked,

    /// Bad signature, malformed payload or past expiry.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The token is valid but its principal no longer exists.
    #[error("Principal not found")]
    PrincipalNotFound,

    /// A gate lookup exceeded its time budget. Treated as unauthenticated.
    #[error("Authentication lookup timed out")]
    LookupTimeout,

    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
