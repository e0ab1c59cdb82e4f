//! Revocation registry ("blacklist") for bearer tokens.
//!
//! A revoked token is stored as its SHA-256 digest with the instant after
//! which the entry no longer matters. Entries are only consulted while
//! `expires_at > now`, so physical purging is an optimization.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::AuthError;
use super::jwt::TokenService;
use crate::store::RevocationStore;

/// Window used when a token's own expiry cannot be read: 1 hour.
pub const FALLBACK_REVOCATION_SECS: i64 = 60 * 60;

/// SHA-256 hex digest of a token, used as the registry key.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// How long a logout revocation must live: until the token's own expiry, or
/// the fallback window when that expiry is unreadable, out of range or
/// already past.
pub fn logout_window(token: &str, now: DateTime<Utc>, fallback: Duration) -> Duration {
    TokenService::decode_unsafe(token)
        .and_then(|claims| claims.exp)
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
        .map(|exp| exp - now)
        .filter(|remaining| *remaining > Duration::zero())
        .unwrap_or(fallback)
}

/// Registry operations over a [`RevocationStore`].
#[derive(Clone)]
pub struct RevocationRegistry {
    store: Arc<dyn RevocationStore>,
    fallback: Duration,
}

impl RevocationRegistry {
    pub fn new(store: Arc<dyn RevocationStore>, fallback: Duration) -> Self {
        Self { store, fallback }
    }

    /// Revoke `token` for `ttl` from now. Revoking twice is not an error.
    pub async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), AuthError> {
        self.revoke_at(token, ttl, Utc::now()).await
    }

    async fn revoke_at(
        &self,
        token: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal(format!("revocation window out of range: {ttl}")))?;
        self.store
            .insert_revoked(&token_digest(token), expires_at)
            .await?;
        debug!(%expires_at, "token revoked");
        Ok(())
    }

    /// Logout: revoke until the token would have expired on its own.
    pub async fn revoke_for_logout(&self, token: &str) -> Result<(), AuthError> {
        let now = Utc::now();
        let ttl = logout_window(token, now, self.fallback);
        self.revoke_at(token, ttl, now).await
    }

    /// Whether the token is currently revoked.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self
            .store
            .is_revoked(&token_digest(token), Utc::now())
            .await?)
    }

    /// Remove dead entries. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        Ok(self.store.purge_revoked(Utc::now()).await?)
    }
}
