//! Complaint handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use wastewise_core::auth::policy::Operation;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedPrincipal;
use crate::models::{
    ComplaintInfo, CreateComplaintRequest, ProgressUpdateRequest, StatusUpdateRequest,
};
use crate::services::complaints;

/// `POST /api/complaints`
pub async fn submit_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    AppJson(body): AppJson<CreateComplaintRequest>,
) -> AppResult<(StatusCode, Json<ComplaintInfo>)> {
    let complaint = complaints::submit(&state, &principal, body).await?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

/// `GET /api/complaints` — every complaint (admin).
pub async fn list_all_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<Vec<ComplaintInfo>>> {
    let list = complaints::list(&state, &principal, Operation::ListAllComplaints).await?;
    Ok(Json(list))
}

/// `GET /api/complaints/my-complaints` — complaints filed under the caller's email.
pub async fn list_own_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<Vec<ComplaintInfo>>> {
    let list = complaints::list(&state, &principal, Operation::ListOwnComplaints).await?;
    Ok(Json(list))
}

/// `GET /api/complaints/area` — accepted complaints in the manager's area.
pub async fn list_area_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<Vec<ComplaintInfo>>> {
    let list = complaints::list(&state, &principal, Operation::ListAreaComplaints).await?;
    Ok(Json(list))
}

/// `PATCH /api/complaints/{id}/status`
pub async fn review_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    Path(id): Path<String>,
    AppJson(body): AppJson<StatusUpdateRequest>,
) -> AppResult<Json<ComplaintInfo>> {
    Ok(Json(complaints::review(&state, &principal, &id, body).await?))
}

/// `PATCH /api/complaints/{id}/progress`
pub async fn progress_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    Path(id): Path<String>,
    AppJson(body): AppJson<ProgressUpdateRequest>,
) -> AppResult<Json<ComplaintInfo>> {
    Ok(Json(
        complaints::update_progress(&state, &principal, &id, body).await?,
    ))
}
