//! Bearer token claim models.

use serde::{Deserialize, Serialize};

use super::principal::Role;

/// JWT claims embedded in bearer tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — principal ID (standard JWT `sub` claim).
    pub sub: String,
    /// Principal email.
    pub email: String,
    /// Role at issuance. Only used to pick the principal collection on
    /// re-fetch; the fresh record's role is authoritative.
    pub role: Role,
    /// Area at issuance, if the principal has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// Claims read from a token without checking its signature.
///
/// Every field is optional because nothing about an unverified payload can be
/// assumed. Never use this to make an access decision.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UnverifiedClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}
