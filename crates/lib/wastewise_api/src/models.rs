//! API request and response models.
//!
//! Wire format is camelCase. Required request fields are `Option` so that a
//! missing field surfaces as a 400 validation error rather than a JSON
//! extractor rejection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wastewise_core::models::{
    AreaManager, AreaSummary, Citizen, Complaint, ComplaintStatus, GeoPoint, Principal, Progress,
    Role,
};

use crate::error::{AppError, AppResult};

/// Return the trimmed value of a required field, or a validation error.
pub fn required(value: Option<String>, field: &str) -> AppResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

/// Canonical form for email lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub version: String,
    pub store_connected: bool,
}

// ---------------------------------------------------------------------------
// Citizens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Returned by signup and citizen login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenAuthResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub area: Option<String>,
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

impl CitizenAuthResponse {
    pub fn new(citizen: Citizen, token: String, expires_in: i64) -> Self {
        Self {
            id: citizen.id,
            username: citizen.username,
            email: citizen.email,
            role: citizen.role,
            area: citizen.area,
            token,
            token_type: "Bearer".into(),
            expires_in,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Profile of the authenticated principal. Credential material is never
/// included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl From<Principal> for ProfileResponse {
    fn from(p: Principal) -> Self {
        let role = p.role();
        match p {
            Principal::Citizen(c) => Self {
                id: c.id,
                email: c.email,
                role,
                area: c.area,
                username: Some(c.username),
                nic: None,
                first_name: None,
                last_name: None,
            },
            Principal::Manager(m) => Self {
                id: m.id,
                email: m.email,
                role,
                area: Some(m.area),
                username: None,
                nic: Some(m.nic),
                first_name: Some(m.first_name),
                last_name: Some(m.last_name),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Area managers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaManagerInfo {
    pub id: Uuid,
    pub nic: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub area: String,
    pub role: Role,
}

impl From<AreaManager> for AreaManagerInfo {
    fn from(m: AreaManager) -> Self {
        Self {
            id: m.id,
            nic: m.nic,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            area: m.area,
            role: Role::Manager,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerLoginResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub manager: AreaManagerInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAreaManagerRequest {
    pub nic: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub area: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Partial update. Absent or empty fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAreaManagerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub area: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub description: Option<String>,
    /// Area name the complaint belongs to.
    pub area: Option<String>,
    /// Map coordinates.
    pub location: Option<GeoPoint>,
    pub waste_type: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub description: String,
    pub location: GeoPoint,
    pub area: String,
    pub waste_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub status: ComplaintStatus,
    pub progress: Progress,
    pub created_at: String,
}

impl From<Complaint> for ComplaintInfo {
    fn from(c: Complaint) -> Self {
        Self {
            id: c.id,
            username: c.username,
            email: c.email,
            description: c.description,
            location: c.location,
            area: c.area,
            waste_type: c.waste_type,
            image: c.image,
            status: c.status,
            progress: c.progress,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressUpdateRequest {
    pub progress: Option<String>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSummaryInfo {
    pub area: String,
    pub total_complaints: i64,
    pub pending_complaints: i64,
    pub rejected_complaints: i64,
}

impl From<AreaSummary> for AreaSummaryInfo {
    fn from(s: AreaSummary) -> Self {
        Self {
            area: s.area,
            total_complaints: s.total_complaints,
            pending_complaints: s.pending_complaints,
            rejected_complaints: s.rejected_complaints,
        }
    }
}
