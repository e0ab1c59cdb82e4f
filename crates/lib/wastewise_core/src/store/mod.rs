//! Storage seams for principals, revoked tokens and complaints.
//!
//! Each concern is an async trait with a PostgreSQL implementation
//! ([`postgres::PgStore`]) and an in-process one ([`memory::MemoryStore`]).
//! Uniqueness (emails, NIC numbers, revoked tokens) is always enforced by the
//! backend itself; the losing concurrent insert gets [`StoreError::Conflict`].

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AreaManager, AreaManagerUpdate, AreaSummary, Citizen, Complaint, ComplaintFilter,
    ComplaintStatus, Credentials, NewAreaManager, NewCitizen, NewComplaint, Principal,
    PrincipalKind, Progress, ProgressCount, StatusCount,
};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field (email, NIC, token) is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored value could not be mapped back to a domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Result type for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Credential store: citizens and area managers.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Cheap connectivity check.
    async fn ping(&self) -> StoreResult<()>;

    async fn insert_citizen(&self, new: NewCitizen) -> StoreResult<Citizen>;

    async fn find_citizen(&self, id: Uuid) -> StoreResult<Option<Credentials<Citizen>>>;

    async fn find_citizen_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Credentials<Citizen>>>;

    /// Replace a citizen's password hash. Returns `false` if the citizen is gone.
    async fn set_citizen_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool>;

    async fn insert_manager(&self, new: NewAreaManager) -> StoreResult<AreaManager>;

    async fn find_manager(&self, id: Uuid) -> StoreResult<Option<AreaManager>>;

    async fn find_manager_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Credentials<AreaManager>>>;

    async fn find_manager_by_nic(&self, nic: &str) -> StoreResult<Option<AreaManager>>;

    async fn list_managers(&self) -> StoreResult<Vec<AreaManager>>;

    /// Apply a partial update. Returns `None` if no manager has this NIC.
    async fn update_manager(
        &self,
        nic: &str,
        update: AreaManagerUpdate,
    ) -> StoreResult<Option<AreaManager>>;

    /// Returns `false` if no manager has this NIC.
    async fn delete_manager(&self, nic: &str) -> StoreResult<bool>;

    /// Fetch a principal of the given kind without its credential hash.
    async fn find_principal(
        &self,
        kind: PrincipalKind,
        id: Uuid,
    ) -> StoreResult<Option<Principal>> {
        Ok(match kind {
            PrincipalKind::Citizen => self.find_citizen(id).await?.map(|c| c.principal.into()),
            PrincipalKind::Manager => self.find_manager(id).await?.map(Principal::from),
        })
    }
}

/// Revocation registry storage, keyed by token digest.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record a revoked token. Inserting an existing digest is not an error.
    async fn insert_revoked(&self, token_hash: &str, expires_at: DateTime<Utc>)
    -> StoreResult<()>;

    /// Whether a revocation for this digest exists with `expires_at > now`.
    async fn is_revoked(&self, token_hash: &str, now: DateTime<Utc>) -> StoreResult<bool>;

    /// Physically remove entries with `expires_at <= now`. Returns the count removed.
    async fn purge_revoked(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Complaint storage and aggregation.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    async fn insert_complaint(&self, new: NewComplaint) -> StoreResult<Complaint>;

    async fn find_complaint(&self, id: Uuid) -> StoreResult<Option<Complaint>>;

    async fn list_complaints(&self, filter: &ComplaintFilter) -> StoreResult<Vec<Complaint>>;

    async fn set_status(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> StoreResult<Option<Complaint>>;

    /// Update progress. When `area` is set, only a complaint in that area is
    /// updated; anything else reports `None` as if it did not exist.
    async fn set_progress(
        &self,
        id: Uuid,
        progress: Progress,
        area: Option<&str>,
    ) -> StoreResult<Option<Complaint>>;

    /// Per-area totals, sorted by total descending.
    async fn area_summaries(&self) -> StoreResult<Vec<AreaSummary>>;

    /// Counts per status, sorted by count descending.
    async fn status_counts(&self) -> StoreResult<Vec<StatusCount>>;

    /// Counts per progress value, sorted by progress label ascending.
    async fn progress_counts(&self) -> StoreResult<Vec<ProgressCount>>;
}

/// The set of stores the application runs on.
#[derive(Clone)]
pub struct Stores {
    pub principals: Arc<dyn PrincipalStore>,
    pub revocations: Arc<dyn RevocationStore>,
    pub complaints: Arc<dyn ComplaintStore>,
}

impl Stores {
    /// All stores backed by one PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            principals: store.clone(),
            revocations: store.clone(),
            complaints: store,
        }
    }

    /// All stores backed by one in-process store. Data is lost on exit.
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            principals: store.clone(),
            revocations: store.clone(),
            complaints: store,
        }
    }
}
