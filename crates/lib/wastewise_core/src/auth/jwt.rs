//! Bearer token issuance and verification (JWT, HS256).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::AuthError;
use crate::models::Principal;
use crate::models::auth::{TokenClaims, UnverifiedClaims};

/// Citizen and admin token lifetime: 30 days.
pub const CITIZEN_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Area manager token lifetime: 1 hour.
pub const MANAGER_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Token lifetimes per principal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    pub citizen: Duration,
    pub manager: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            citizen: Duration::seconds(CITIZEN_TOKEN_TTL_SECS),
            manager: Duration::seconds(MANAGER_TOKEN_TTL_SECS),
        }
    }
}

/// Mints and verifies bearer tokens with a single shared secret.
///
/// The secret is handed over at construction and never leaves this type.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttls: TokenTtls,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttls", &self.ttls)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a token service. An empty secret is refused.
    pub fn new(secret: &[u8], ttls: TokenTtls) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttls,
        })
    }

    pub fn ttls(&self) -> TokenTtls {
        self.ttls
    }

    /// Lifetime for tokens issued to this principal's variant.
    pub fn ttl_for(&self, principal: &Principal) -> Duration {
        match principal {
            Principal::Citizen(_) => self.ttls.citizen,
            Principal::Manager(_) => self.ttls.manager,
        }
    }

    /// Issue a token with the default lifetime for the principal's variant.
    pub fn issue_for(&self, principal: &Principal) -> Result<String, AuthError> {
        self.issue(principal, self.ttl_for(principal))
    }

    /// Issue a token valid for `ttl` from now.
    pub fn issue(&self, principal: &Principal, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(principal, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        principal: &Principal,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal(format!("token lifetime out of range: {ttl}")))?;
        let claims = TokenClaims {
            sub: principal.id().to_string(),
            email: principal.email().to_string(),
            role: principal.role(),
            area: principal.area().map(str::to_string),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify signature, payload shape and expiry.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify against an explicit clock. A token whose `exp` equals `now` is
    /// already expired; no leeway is applied.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now` with a strict comparison.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::InvalidToken("token expired".into()));
        }
        Ok(claims)
    }

    /// Read the payload without checking the signature.
    ///
    /// Information only: used at logout to size the revocation window. Never
    /// authorize anything from the result.
    pub fn decode_unsafe(token: &str) -> Option<UnverifiedClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .map(|data| data.claims)
    }
}
