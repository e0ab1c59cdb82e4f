//! In-process store.
//!
//! Used by the server's `--in-memory` mode and by tests. Uniqueness checks run
//! under the same write lock as the insert, so concurrent duplicates resolve to
//! exactly one winner just like the database constraints.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ComplaintStore, PrincipalStore, RevocationStore, StoreError, StoreResult};
use crate::models::{
    AreaManager, AreaManagerUpdate, AreaSummary, Citizen, Complaint, ComplaintFilter,
    ComplaintStatus, Credentials, NewAreaManager, NewCitizen, NewComplaint, Progress,
    ProgressCount, StatusCount,
};

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    citizens: RwLock<HashMap<Uuid, Credentials<Citizen>>>,
    managers: RwLock<HashMap<Uuid, Credentials<AreaManager>>>,
    complaints: RwLock<Vec<Complaint>>,
    /// Token digest → expiry.
    revoked: DashMap<String, DateTime<Utc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_citizen(&self, new: NewCitizen) -> StoreResult<Citizen> {
        let mut citizens = self.citizens.write().await;
        if citizens.values().any(|c| c.principal.email == new.email) {
            return Err(StoreError::Conflict("email already registered".into()));
        }
        let citizen = Citizen {
            id: Uuid::now_v7(),
            username: new.username,
            email: new.email,
            role: new.role,
            area: new.area,
            created_at: Utc::now(),
        };
        citizens.insert(
            citizen.id,
            Credentials {
                principal: citizen.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(citizen)
    }

    async fn find_citizen(&self, id: Uuid) -> StoreResult<Option<Credentials<Citizen>>> {
        Ok(self.citizens.read().await.get(&id).cloned())
    }

    async fn find_citizen_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Credentials<Citizen>>> {
        Ok(self
            .citizens
            .read()
            .await
            .values()
            .find(|c| c.principal.email == email)
            .cloned())
    }

    async fn set_citizen_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        match self.citizens.write().await.get_mut(&id) {
            Some(c) => {
                c.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_manager(&self, new: NewAreaManager) -> StoreResult<AreaManager> {
        let mut managers = self.managers.write().await;
        for m in managers.values() {
            if m.principal.nic == new.nic {
                return Err(StoreError::Conflict("NIC number already registered".into()));
            }
            if m.principal.email == new.email {
                return Err(StoreError::Conflict("email already registered".into()));
            }
        }
        let manager = AreaManager {
            id: Uuid::now_v7(),
            nic: new.nic,
            first_name: new.first_name,
            last_name: new.last_name,
            area: new.area,
            email: new.email,
            created_at: Utc::now(),
        };
        managers.insert(
            manager.id,
            Credentials {
                principal: manager.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(manager)
    }

    async fn find_manager(&self, id: Uuid) -> StoreResult<Option<AreaManager>> {
        Ok(self
            .managers
            .read()
            .await
            .get(&id)
            .map(|m| m.principal.clone()))
    }

    async fn find_manager_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Credentials<AreaManager>>> {
        Ok(self
            .managers
            .read()
            .await
            .values()
            .find(|m| m.principal.email == email)
            .cloned())
    }

    async fn find_manager_by_nic(&self, nic: &str) -> StoreResult<Option<AreaManager>> {
        Ok(self
            .managers
            .read()
            .await
            .values()
            .find(|m| m.principal.nic == nic)
            .map(|m| m.principal.clone()))
    }

    async fn list_managers(&self) -> StoreResult<Vec<AreaManager>> {
        let mut list: Vec<AreaManager> = self
            .managers
            .read()
            .await
            .values()
            .map(|m| m.principal.clone())
            .collect();
        list.sort_by_key(|m| m.created_at);
        Ok(list)
    }

    async fn update_manager(
        &self,
        nic: &str,
        update: AreaManagerUpdate,
    ) -> StoreResult<Option<AreaManager>> {
        let mut managers = self.managers.write().await;
        let Some(id) = managers
            .values()
            .find(|m| m.principal.nic == nic)
            .map(|m| m.principal.id)
        else {
            return Ok(None);
        };
        if let Some(email) = &update.email
            && managers
                .values()
                .any(|m| m.principal.id != id && &m.principal.email == email)
        {
            return Err(StoreError::Conflict("email already registered".into()));
        }
        let Some(entry) = managers.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(entry);
        Ok(Some(entry.principal.clone()))
    }

    async fn delete_manager(&self, nic: &str) -> StoreResult<bool> {
        let mut managers = self.managers.write().await;
        let before = managers.len();
        managers.retain(|_, m| m.principal.nic != nic);
        Ok(managers.len() < before)
    }
}

#[async_trait]
impl RevocationStore for MemoryStore {
    async fn insert_revoked(
        &self,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.revoked
            .entry(token_hash.to_string())
            .and_modify(|e| *e = (*e).max(expires_at))
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token_hash: &str, now: DateTime<Utc>) -> StoreResult<bool> {
        Ok(self
            .revoked
            .get(token_hash)
            .is_some_and(|expires_at| *expires_at > now))
    }

    async fn purge_revoked(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let before = self.revoked.len();
        self.revoked.retain(|_, expires_at| *expires_at > now);
        Ok(before.saturating_sub(self.revoked.len()) as u64)
    }
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn insert_complaint(&self, new: NewComplaint) -> StoreResult<Complaint> {
        let complaint = Complaint {
            id: Uuid::now_v7(),
            username: new.username,
            email: new.email,
            description: new.description,
            location: new.location,
            area: new.area,
            waste_type: new.waste_type,
            image: new.image,
            status: ComplaintStatus::Pending,
            progress: Progress::Recorded,
            created_at: Utc::now(),
        };
        self.complaints.write().await.push(complaint.clone());
        Ok(complaint)
    }

    async fn find_complaint(&self, id: Uuid) -> StoreResult<Option<Complaint>> {
        Ok(self
            .complaints
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list_complaints(&self, filter: &ComplaintFilter) -> StoreResult<Vec<Complaint>> {
        Ok(self
            .complaints
            .read()
            .await
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> StoreResult<Option<Complaint>> {
        let mut complaints = self.complaints.write().await;
        Ok(complaints.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            c.clone()
        }))
    }

    async fn set_progress(
        &self,
        id: Uuid,
        progress: Progress,
        area: Option<&str>,
    ) -> StoreResult<Option<Complaint>> {
        let mut complaints = self.complaints.write().await;
        Ok(complaints
            .iter_mut()
            .find(|c| c.id == id && area.is_none_or(|a| a == c.area))
            .map(|c| {
                c.progress = progress;
                c.clone()
            }))
    }

    async fn area_summaries(&self) -> StoreResult<Vec<AreaSummary>> {
        let complaints = self.complaints.read().await;
        let mut by_area: HashMap<&str, AreaSummary> = HashMap::new();
        for c in complaints.iter() {
            let entry = by_area.entry(c.area.as_str()).or_insert_with(|| AreaSummary {
                area: c.area.clone(),
                total_complaints: 0,
                pending_complaints: 0,
                rejected_complaints: 0,
            });
            entry.total_complaints += 1;
            match c.status {
                ComplaintStatus::Pending => entry.pending_complaints += 1,
                ComplaintStatus::Rejected => entry.rejected_complaints += 1,
                ComplaintStatus::Accepted => {}
            }
        }
        let mut list: Vec<AreaSummary> = by_area.into_values().collect();
        list.sort_by(|a, b| {
            b.total_complaints
                .cmp(&a.total_complaints)
                .then_with(|| a.area.cmp(&b.area))
        });
        Ok(list)
    }

    async fn status_counts(&self) -> StoreResult<Vec<StatusCount>> {
        let complaints = self.complaints.read().await;
        let mut counts: HashMap<ComplaintStatus, i64> = HashMap::new();
        for c in complaints.iter() {
            *counts.entry(c.status).or_default() += 1;
        }
        let mut list: Vec<StatusCount> = counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();
        list.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.status.as_str().cmp(b.status.as_str()))
        });
        Ok(list)
    }

    async fn progress_counts(&self) -> StoreResult<Vec<ProgressCount>> {
        let complaints = self.complaints.read().await;
        let mut counts: HashMap<Progress, i64> = HashMap::new();
        for c in complaints.iter() {
            *counts.entry(c.progress).or_default() += 1;
        }
        let mut list: Vec<ProgressCount> = counts
            .into_iter()
            .map(|(progress, count)| ProgressCount { progress, count })
            .collect();
        list.sort_by(|a, b| a.progress.as_str().cmp(b.progress.as_str()));
        Ok(list)
    }
}
