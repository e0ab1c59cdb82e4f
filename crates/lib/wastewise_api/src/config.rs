//! API server configuration.

use std::fmt;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;
use wastewise_core::auth::jwt::{CITIZEN_TOKEN_TTL_SECS, MANAGER_TOKEN_TTL_SECS, TokenTtls};
use wastewise_core::auth::revocation::FALLBACK_REVOCATION_SECS;

/// Default interval between revocation purges: 15 minutes.
const DEFAULT_PURGE_INTERVAL_SECS: u64 = 15 * 60;

/// Default budget for each gate lookup: 5 seconds.
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;

/// Longest accepted token or revocation lifetime: 10 years.
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set")]
    MissingSecret,

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Administrator account ensured at startup.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret. Never logged.
    pub jwt_secret: String,
    /// Lifetime of citizen and admin tokens.
    pub citizen_token_ttl: chrono::Duration,
    /// Lifetime of area manager tokens.
    pub manager_token_ttl: chrono::Duration,
    /// Revocation window when a token's expiry cannot be read at logout.
    pub revocation_fallback: chrono::Duration,
    /// Budget for each store lookup in the authentication gate.
    pub auth_lookup_timeout: Duration,
    /// Interval between purges of dead revocation entries.
    pub revocation_purge_interval: Duration,
    /// Optional administrator ensured at startup.
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Origins allowed by CORS. Empty allows any origin.
    pub allowed_origins: Vec<HeaderValue>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("citizen_token_ttl", &self.citizen_token_ttl)
            .field("manager_token_ttl", &self.manager_token_ttl)
            .field("revocation_fallback", &self.revocation_fallback)
            .field("auth_lookup_timeout", &self.auth_lookup_timeout)
            .field("revocation_purge_interval", &self.revocation_purge_interval)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration with the given secret and default everything else.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".into(),
            database_url: "postgres://localhost:5432/wastewise".into(),
            jwt_secret: jwt_secret.into(),
            citizen_token_ttl: chrono::Duration::seconds(CITIZEN_TOKEN_TTL_SECS),
            manager_token_ttl: chrono::Duration::seconds(MANAGER_TOKEN_TTL_SECS),
            revocation_fallback: chrono::Duration::seconds(FALLBACK_REVOCATION_SECS),
            auth_lookup_timeout: Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
            revocation_purge_interval: Duration::from_secs(DEFAULT_PURGE_INTERVAL_SECS),
            bootstrap_admin: None,
            allowed_origins: Vec::new(),
        }
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                     | Default                                   |
    /// |------------------------------|-------------------------------------------|
    /// | `BIND_ADDR`                  | `127.0.0.1:5000`                          |
    /// | `DATABASE_URL`               | `postgres://localhost:5432/wastewise`     |
    /// | `JWT_SECRET`                 | required                                  |
    /// | `CITIZEN_TOKEN_TTL_SECS`     | 30 days                                   |
    /// | `MANAGER_TOKEN_TTL_SECS`     | 1 hour                                    |
    /// | `REVOCATION_FALLBACK_SECS`   | 1 hour                                    |
    /// | `AUTH_LOOKUP_TIMEOUT_MS`     | 5000                                      |
    /// | `REVOCATION_PURGE_SECS`      | 900                                       |
    /// | `ALLOWED_ORIGINS`            | unset or `*` (any origin)                 |
    /// | `ADMIN_EMAIL` / `ADMIN_PASSWORD` / `ADMIN_USERNAME` | unset (no bootstrap) |
    ///
    /// Lifetimes above ten years are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = var("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;
        let mut config = Self::new(secret);

        if let Some(v) = var("BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Some(v) = var("DATABASE_URL") {
            config.database_url = v;
        }
        if let Some(v) = ttl(&var, "CITIZEN_TOKEN_TTL_SECS")? {
            config.citizen_token_ttl = v;
        }
        if let Some(v) = ttl(&var, "MANAGER_TOKEN_TTL_SECS")? {
            config.manager_token_ttl = v;
        }
        if let Some(v) = ttl(&var, "REVOCATION_FALLBACK_SECS")? {
            config.revocation_fallback = v;
        }
        if let Some(v) = number(&var, "AUTH_LOOKUP_TIMEOUT_MS")? {
            config.auth_lookup_timeout = Duration::from_millis(v);
        }
        if let Some(v) = number(&var, "REVOCATION_PURGE_SECS")? {
            if v == 0 {
                return Err(ConfigError::Invalid(
                    "REVOCATION_PURGE_SECS",
                    "must be greater than zero".into(),
                ));
            }
            config.revocation_purge_interval = Duration::from_secs(v);
        }
        if let Some(v) = var("ALLOWED_ORIGINS") {
            config.allowed_origins = origins(&v)?;
        }
        if let (Some(email), Some(password)) = (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            config.bootstrap_admin = Some(BootstrapAdmin {
                email,
                password,
                username: var("ADMIN_USERNAME").unwrap_or_else(|| "Admin".into()),
            });
        }
        Ok(config)
    }

    /// Token lifetimes as used by the token service.
    pub fn token_ttls(&self) -> TokenTtls {
        TokenTtls {
            citizen: self.citizen_token_ttl,
            manager: self.manager_token_ttl,
        }
    }
}

fn number(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    var(key)
        .map(|v| {
            v.parse::<u64>()
                .map_err(|e| ConfigError::Invalid(key, e.to_string()))
        })
        .transpose()
}

/// Lifetime in whole seconds, bounded by [`MAX_TTL_SECS`].
fn ttl(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<chrono::Duration>, ConfigError> {
    let Some(secs) = number(var, key)? else {
        return Ok(None);
    };
    if secs > MAX_TTL_SECS {
        return Err(ConfigError::Invalid(
            key,
            format!("must not exceed {MAX_TTL_SECS} seconds"),
        ));
    }
    let secs = i64::try_from(secs).map_err(|e| ConfigError::Invalid(key, e.to_string()))?;
    Ok(Some(chrono::Duration::seconds(secs)))
}

/// Comma-separated origin list. `*` or an empty list allows any origin.
fn origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| ConfigError::Invalid("ALLOWED_ORIGINS", e.to_string()))
        })
        .collect()
}
