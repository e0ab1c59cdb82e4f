//! Complaint flows. Every scope decision comes from the resolved principal.

use tracing::info;
use uuid::Uuid;
use wastewise_core::auth::policy::{Operation, authorize, complaint_filter, progress_area};
use wastewise_core::models::{ComplaintStatus, GeoPoint, NewComplaint, Principal, Progress};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    ComplaintInfo, CreateComplaintRequest, ProgressUpdateRequest, StatusUpdateRequest, required,
};

fn not_found() -> AppError {
    AppError::NotFound("Complaint not found".into())
}

/// Unparseable ids cannot name a complaint.
fn complaint_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

fn check_location(location: Option<GeoPoint>) -> AppResult<GeoPoint> {
    let p = location.ok_or_else(|| AppError::Validation("location is required".into()))?;
    if !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lng) {
        return Err(AppError::Validation("Invalid location".into()));
    }
    Ok(p)
}

/// File a complaint. Username and email come from the principal.
pub async fn submit(
    state: &AppState,
    principal: &Principal,
    req: CreateComplaintRequest,
) -> AppResult<ComplaintInfo> {
    authorize(principal, Operation::SubmitComplaint)?;
    let description = required(req.description, "description")?;
    let area = required(req.area, "area")?;
    let waste_type = required(req.waste_type, "wasteType")?;
    let location = check_location(req.location)?;
    let image = req
        .image
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty());

    let complaint = state
        .stores
        .complaints
        .insert_complaint(NewComplaint {
            username: principal.display_name(),
            email: principal.email().to_string(),
            description,
            location,
            area,
            waste_type,
            image,
        })
        .await?;

    info!(id = %complaint.id, area = %complaint.area, "complaint submitted");
    Ok(complaint.into())
}

/// List complaints for one of the listing operations.
pub async fn list(
    state: &AppState,
    principal: &Principal,
    op: Operation,
) -> AppResult<Vec<ComplaintInfo>> {
    let filter = complaint_filter(principal, op)?;
    let complaints = state.stores.complaints.list_complaints(&filter).await?;
    Ok(complaints.into_iter().map(ComplaintInfo::from).collect())
}

/// Accept or reject a complaint.
pub async fn review(
    state: &AppState,
    principal: &Principal,
    id: &str,
    req: StatusUpdateRequest,
) -> AppResult<ComplaintInfo> {
    authorize(principal, Operation::ReviewComplaint)?;
    let status = req
        .status
        .as_deref()
        .and_then(|s| s.parse::<ComplaintStatus>().ok())
        .filter(|s| *s != ComplaintStatus::Pending)
        .ok_or_else(|| AppError::Validation("Invalid status".into()))?;
    let id = complaint_id(id)?;

    let complaint = state
        .stores
        .complaints
        .set_status(id, status)
        .await?
        .ok_or_else(not_found)?;

    info!(%id, %status, "complaint reviewed");
    Ok(complaint.into())
}

/// Move a complaint's progress. Managers only reach their own area.
pub async fn update_progress(
    state: &AppState,
    principal: &Principal,
    id: &str,
    req: ProgressUpdateRequest,
) -> AppResult<ComplaintInfo> {
    let area = progress_area(principal)?;
    let progress = req
        .progress
        .as_deref()
        .and_then(|p| p.parse::<Progress>().ok())
        .ok_or_else(|| AppError::Validation("Invalid progress status".into()))?;
    let id = complaint_id(id)?;

    let complaint = state
        .stores
        .complaints
        .set_progress(id, progress, area)
        .await?
        .ok_or_else(not_found)?;

    info!(%id, %progress, "complaint progress updated");
    Ok(complaint.into())
}
