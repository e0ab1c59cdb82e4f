//! PostgreSQL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{ComplaintStore, PrincipalStore, RevocationStore, StoreError, StoreResult};
use crate::models::{
    AreaManager, AreaManagerUpdate, AreaSummary, Citizen, Complaint, ComplaintFilter,
    ComplaintStatus, Credentials, GeoPoint, NewAreaManager, NewCitizen, NewComplaint, Progress,
    ProgressCount, StatusCount,
};

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Map a unique violation to [`StoreError::Conflict`], anything else to `Db`.
fn conflict_or_db(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        let what = match db.constraint() {
            Some("citizens_email_key") | Some("area_managers_email_key") => {
                "email already registered"
            }
            Some("area_managers_nic_key") => "NIC number already registered",
            _ => "duplicate record",
        };
        return StoreError::Conflict(what.to_string());
    }
    StoreError::Db(e)
}

fn parse<T: std::str::FromStr<Err = String>>(value: &str) -> StoreResult<T> {
    value.parse().map_err(StoreError::Corrupt)
}

#[derive(FromRow)]
struct CitizenRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    area: Option<String>,
    created_at: DateTime<Utc>,
}

impl CitizenRow {
    fn into_credentials(self) -> StoreResult<Credentials<Citizen>> {
        Ok(Credentials {
            principal: Citizen {
                id: self.id,
                username: self.username,
                email: self.email,
                role: parse(&self.role)?,
                area: self.area,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct ManagerRow {
    id: Uuid,
    nic: String,
    first_name: String,
    last_name: String,
    area: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl ManagerRow {
    fn into_credentials(self) -> Credentials<AreaManager> {
        Credentials {
            principal: AreaManager {
                id: self.id,
                nic: self.nic,
                first_name: self.first_name,
                last_name: self.last_name,
                area: self.area,
                email: self.email,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct ComplaintRow {
    id: Uuid,
    username: String,
    email: String,
    description: String,
    lat: f64,
    lng: f64,
    area: String,
    waste_type: String,
    image: Option<String>,
    status: String,
    progress: String,
    created_at: DateTime<Utc>,
}

impl ComplaintRow {
    fn into_complaint(self) -> StoreResult<Complaint> {
        Ok(Complaint {
            id: self.id,
            username: self.username,
            email: self.email,
            description: self.description,
            location: GeoPoint {
                lat: self.lat,
                lng: self.lng,
            },
            area: self.area,
            waste_type: self.waste_type,
            image: self.image,
            status: parse(&self.status)?,
            progress: parse(&self.progress)?,
            created_at: self.created_at,
        })
    }
}

const CITIZEN_COLUMNS: &str = "id, username, email, password_hash, role, area, created_at";
const MANAGER_COLUMNS: &str =
    "id, nic, first_name, last_name, area, email, password_hash, created_at";
const COMPLAINT_COLUMNS: &str = "id, username, email, description, lat, lng, area, waste_type, \
     image, status, progress, created_at";

/// Store backed by a PostgreSQL pool. Implements every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_citizen(&self, new: NewCitizen) -> StoreResult<Citizen> {
        let row = sqlx::query_as::<_, CitizenRow>(&format!(
            "INSERT INTO citizens (id, username, email, password_hash, role, area) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CITIZEN_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(&new.area)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or_db)?;
        Ok(row.into_credentials()?.principal)
    }

    async fn find_citizen(&self, id: Uuid) -> StoreResult<Option<Credentials<Citizen>>> {
        let row = sqlx::query_as::<_, CitizenRow>(&format!(
            "SELECT {CITIZEN_COLUMNS} FROM citizens WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CitizenRow::into_credentials).transpose()
    }

    async fn find_citizen_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Credentials<Citizen>>> {
        let row = sqlx::query_as::<_, CitizenRow>(&format!(
            "SELECT {CITIZEN_COLUMNS} FROM citizens WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CitizenRow::into_credentials).transpose()
    }

    async fn set_citizen_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE citizens SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_manager(&self, new: NewAreaManager) -> StoreResult<AreaManager> {
        let row = sqlx::query_as::<_, ManagerRow>(&format!(
            "INSERT INTO area_managers \
             (id, nic, first_name, last_name, area, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {MANAGER_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(&new.nic)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.area)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or_db)?;
        Ok(row.into_credentials().principal)
    }

    async fn find_manager(&self, id: Uuid) -> StoreResult<Option<AreaManager>> {
        let row = sqlx::query_as::<_, ManagerRow>(&format!(
            "SELECT {MANAGER_COLUMNS} FROM area_managers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_credentials().principal))
    }

    async fn find_manager_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Credentials<AreaManager>>> {
        let row = sqlx::query_as::<_, ManagerRow>(&format!(
            "SELECT {MANAGER_COLUMNS} FROM area_managers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ManagerRow::into_credentials))
    }

    async fn find_manager_by_nic(&self, nic: &str) -> StoreResult<Option<AreaManager>> {
        let row = sqlx::query_as::<_, ManagerRow>(&format!(
            "SELECT {MANAGER_COLUMNS} FROM area_managers WHERE nic = $1"
        ))
        .bind(nic)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_credentials().principal))
    }

    async fn list_managers(&self) -> StoreResult<Vec<AreaManager>> {
        let rows = sqlx::query_as::<_, ManagerRow>(&format!(
            "SELECT {MANAGER_COLUMNS} FROM area_managers ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| r.into_credentials().principal)
            .collect())
    }

    async fn update_manager(
        &self,
        nic: &str,
        update: AreaManagerUpdate,
    ) -> StoreResult<Option<AreaManager>> {
        let row = sqlx::query_as::<_, ManagerRow>(&format!(
            "UPDATE area_managers SET \
               first_name = COALESCE($2, first_name), \
               last_name = COALESCE($3, last_name), \
               area = COALESCE($4, area), \
               email = COALESCE($5, email), \
               password_hash = COALESCE($6, password_hash) \
             WHERE nic = $1 RETURNING {MANAGER_COLUMNS}"
        ))
        .bind(nic)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.area)
        .bind(update.email)
        .bind(update.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_or_db)?;
        Ok(row.map(|r| r.into_credentials().principal))
    }

    async fn delete_manager(&self, nic: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM area_managers WHERE nic = $1")
            .bind(nic)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RevocationStore for PgStore {
    async fn insert_revoked(
        &self,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO revoked_tokens (token_hash, expires_at) VALUES ($1, $2) \
             ON CONFLICT (token_hash) DO UPDATE \
             SET expires_at = GREATEST(revoked_tokens.expires_at, EXCLUDED.expires_at)",
        )
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_revoked(&self, token_hash: &str, now: DateTime<Utc>) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token_hash = $1 AND expires_at > $2)",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn purge_revoked(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ComplaintStore for PgStore {
    async fn insert_complaint(&self, new: NewComplaint) -> StoreResult<Complaint> {
        let row = sqlx::query_as::<_, ComplaintRow>(&format!(
            "INSERT INTO complaints \
             (id, username, email, description, lat, lng, area, waste_type, image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COMPLAINT_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.description)
        .bind(new.location.lat)
        .bind(new.location.lng)
        .bind(&new.area)
        .bind(&new.waste_type)
        .bind(&new.image)
        .fetch_one(&self.pool)
        .await?;
        row.into_complaint()
    }

    async fn find_complaint(&self, id: Uuid) -> StoreResult<Option<Complaint>> {
        let row = sqlx::query_as::<_, ComplaintRow>(&format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ComplaintRow::into_complaint).transpose()
    }

    async fn list_complaints(&self, filter: &ComplaintFilter) -> StoreResult<Vec<Complaint>> {
        let rows = sqlx::query_as::<_, ComplaintRow>(&format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints \
             WHERE ($1::text IS NULL OR email = $1) \
               AND ($2::text IS NULL OR area = $2) \
               AND ($3::text IS NULL OR status = $3) \
             ORDER BY created_at"
        ))
        .bind(&filter.email)
        .bind(&filter.area)
        .bind(filter.status.map(ComplaintStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ComplaintRow::into_complaint).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> StoreResult<Option<Complaint>> {
        let row = sqlx::query_as::<_, ComplaintRow>(&format!(
            "UPDATE complaints SET status = $2 WHERE id = $1 RETURNING {COMPLAINT_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(ComplaintRow::into_complaint).transpose()
    }

    async fn set_progress(
        &self,
        id: Uuid,
        progress: Progress,
        area: Option<&str>,
    ) -> StoreResult<Option<Complaint>> {
        let row = sqlx::query_as::<_, ComplaintRow>(&format!(
            "UPDATE complaints SET progress = $2 \
             WHERE id = $1 AND ($3::text IS NULL OR area = $3) \
             RETURNING {COMPLAINT_COLUMNS}"
        ))
        .bind(id)
        .bind(progress.as_str())
        .bind(area)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ComplaintRow::into_complaint).transpose()
    }

    async fn area_summaries(&self) -> StoreResult<Vec<AreaSummary>> {
        let rows = sqlx::query_as::<_, (String, i64, i64, i64)>(
            "SELECT area, \
                    COUNT(*), \
                    COUNT(*) FILTER (WHERE status = 'pending'), \
                    COUNT(*) FILTER (WHERE status = 'rejected') \
             FROM complaints GROUP BY area ORDER BY COUNT(*) DESC, area",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(area, total, pending, rejected)| AreaSummary {
                area,
                total_complaints: total,
                pending_complaints: pending,
                rejected_complaints: rejected,
            })
            .collect())
    }

    async fn status_counts(&self) -> StoreResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM complaints GROUP BY status ORDER BY COUNT(*) DESC, status",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(status, count)| {
                Ok(StatusCount {
                    status: parse(&status)?,
                    count,
                })
            })
            .collect()
    }

    async fn progress_counts(&self) -> StoreResult<Vec<ProgressCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT progress, COUNT(*) FROM complaints GROUP BY progress ORDER BY progress",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(progress, count)| {
                Ok(ProgressCount {
                    progress: parse(&progress)?,
                    count,
                })
            })
            .collect()
    }
}
