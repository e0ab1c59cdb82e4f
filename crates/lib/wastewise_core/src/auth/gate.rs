//! Authentication gate: bearer token → resolved principal.
//!
//! Steps, terminal on the first failure:
//! 1. extract the bearer token,
//! 2. reject it if revoked,
//! 3. verify signature and expiry,
//! 4. re-fetch the principal named by `sub`.
//!
//! Role and area always come from the re-fetched record. The token's role
//! claim only selects which collection to look in. Store lookups are bounded
//! by a timeout and a timeout fails closed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use super::jwt::TokenService;
use super::revocation::RevocationRegistry;
use crate::models::auth::TokenClaims;
use crate::models::{Principal, PrincipalKind};
use crate::store::PrincipalStore;

/// Default budget for each store lookup performed by the gate.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Extract the token from an `Authorization` header value. The scheme name
/// is matched case-insensitively.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|h| h.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .unwrap_or_default();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Converts bearer tokens into principals.
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenService>,
    revocations: RevocationRegistry,
    principals: Arc<dyn PrincipalStore>,
    lookup_timeout: Duration,
}

impl Authenticator {
    pub fn new(
        tokens: Arc<TokenService>,
        revocations: RevocationRegistry,
        principals: Arc<dyn PrincipalStore>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            tokens,
            revocations,
            principals,
            lookup_timeout,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn revocations(&self) -> &RevocationRegistry {
        &self.revocations
    }

    /// Run the full gate for one token.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        if self.bounded(self.revocations.is_revoked(token)).await? {
            debug!("gate: token is revoked");
            return Err(AuthError::Revoked);
        }

        let claims = self.tokens.verify(token).inspect_err(|e| {
            debug!("gate: token rejected: {e}");
        })?;

        self.resolve(&claims).await
    }

    /// Re-fetch the principal a verified token refers to.
    pub async fn resolve(&self, claims: &TokenClaims) -> Result<Principal, AuthError> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("malformed subject".into()))?;
        let kind = PrincipalKind::from_role(claims.role);

        let principal = self
            .bounded(async {
                self.principals
                    .find_principal(kind, id)
                    .await
                    .map_err(AuthError::from)
            })
            .await?;

        principal.ok_or_else(|| {
            debug!(%id, "gate: principal no longer exists");
            AuthError::PrincipalNotFound
        })
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        tokio::time::timeout(self.lookup_timeout, fut)
            .await
            .map_err(|_| AuthError::LookupTimeout)?
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::auth::jwt::TokenTtls;
    use crate::auth::revocation::FALLBACK_REVOCATION_SECS;
    use crate::models::{NewAreaManager, NewCitizen, Role};
    use crate::store::memory::MemoryStore;
    use crate::store::{RevocationStore, StoreResult};

    struct Fixture {
        store: Arc<MemoryStore>,
        gate: Authenticator,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenService::new(b"secret", TokenTtls::default()).unwrap());
        let revocations = RevocationRegistry::new(
            store.clone(),
            chrono::Duration::seconds(FALLBACK_REVOCATION_SECS),
        );
        let gate = Authenticator::new(tokens, revocations, store.clone(), DEFAULT_LOOKUP_TIMEOUT);
        Fixture { store, gate }
    }

    async fn citizen(store: &MemoryStore, role: Role) -> Principal {
        store
            .insert_citizen(NewCitizen {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password_hash: "hash".into(),
                role,
                area: None,
            })
            .await
            .unwrap()
            .into()
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            bearer_token(Some("Basic abc")),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer ")),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(Some("Bearerabc")),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(Some("bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(Some("BEARER abc")).unwrap(), "abc");
        assert_eq!(bearer_token(Some("BeArEr  abc ")).unwrap(), "abc");
    }

    #[tokio::test]
    async fn valid_token_resolves_fresh_principal() {
        let f = fixture();
        let p = citizen(&f.store, Role::User).await;
        let token = f.gate.tokens().issue_for(&p).unwrap();
        let resolved = f.gate.authenticate(&token).await.unwrap();
        assert_eq!(resolved, p);
    }

    #[tokio::test]
    async fn revoked_token_is_rejected_even_though_signature_verifies() {
        let f = fixture();
        let p = citizen(&f.store, Role::User).await;
        let token = f.gate.tokens().issue_for(&p).unwrap();

        f.gate.revocations().revoke_for_logout(&token).await.unwrap();

        assert!(f.gate.tokens().verify(&token).is_ok());
        assert!(matches!(
            f.gate.authenticate(&token).await,
            Err(AuthError::Revoked)
        ));
    }

    #[tokio::test]
    async fn manager_token_resolves_from_manager_collection() {
        let f = fixture();
        let m: Principal = f
            .store
            .insert_manager(NewAreaManager {
                nic: "N1".into(),
                first_name: "Nora".into(),
                last_name: "Reyes".into(),
                area: "North".into(),
                email: "nora@city.gov".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap()
            .into();
        let token = f.gate.tokens().issue_for(&m).unwrap();
        let resolved = f.gate.authenticate(&token).await.unwrap();
        assert_eq!(resolved.role(), Role::Manager);
        assert_eq!(resolved.area(), Some("North"));
    }

    #[tokio::test]
    async fn area_change_is_seen_immediately() {
        let f = fixture();
        let m: Principal = f
            .store
            .insert_manager(NewAreaManager {
                nic: "N1".into(),
                first_name: "Nora".into(),
                last_name: "Reyes".into(),
                area: "North".into(),
                email: "nora@city.gov".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap()
            .into();
        let token = f.gate.tokens().issue_for(&m).unwrap();

        f.store
            .update_manager(
                "N1",
                crate::models::AreaManagerUpdate {
                    area: Some("South".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let resolved = f.gate.authenticate(&token).await.unwrap();
        assert_eq!(resolved.area(), Some("South"));
    }

    #[tokio::test]
    async fn deleted_principal_is_not_found() {
        let f = fixture();
        let m: Principal = f
            .store
            .insert_manager(NewAreaManager {
                nic: "N1".into(),
                first_name: "Nora".into(),
                last_name: "Reyes".into(),
                area: "North".into(),
                email: "nora@city.gov".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap()
            .into();
        let token = f.gate.tokens().issue_for(&m).unwrap();
        f.store.delete_manager("N1").await.unwrap();

        assert!(matches!(
            f.gate.authenticate(&token).await,
            Err(AuthError::PrincipalNotFound)
        ));
    }

    #[tokio::test]
    async fn forged_token_is_invalid() {
        let f = fixture();
        let p = citizen(&f.store, Role::Admin).await;
        let forged = TokenService::new(b"attacker", TokenTtls::default())
            .unwrap()
            .issue_for(&p)
            .unwrap();
        assert!(matches!(
            f.gate.authenticate(&forged).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    /// Revocation store that never answers in time.
    struct StalledRevocations;

    #[async_trait]
    impl RevocationStore for StalledRevocations {
        async fn insert_revoked(&self, _: &str, _: DateTime<Utc>) -> StoreResult<()> {
            Ok(())
        }

        async fn is_revoked(&self, _: &str, _: DateTime<Utc>) -> StoreResult<bool> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(false)
        }

        async fn purge_revoked(&self, _: DateTime<Utc>) -> StoreResult<u64> {
            Ok(0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_revocation_lookup_fails_closed() {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenService::new(b"secret", TokenTtls::default()).unwrap());
        let revocations =
            RevocationRegistry::new(Arc::new(StalledRevocations), chrono::Duration::hours(1));
        let gate = Authenticator::new(
            tokens.clone(),
            revocations,
            store.clone(),
            Duration::from_millis(50),
        );
        let p = citizen(&store, Role::User).await;
        let token = tokens.issue_for(&p).unwrap();

        assert!(matches!(
            gate.authenticate(&token).await,
            Err(AuthError::LookupTimeout)
        ));
    }
}
