//! Area manager handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use wastewise_core::auth::AuthError;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedPrincipal;
use crate::models::{
    AreaManagerInfo, CreateAreaManagerRequest, LoginRequest, ManagerLoginResponse,
    MessageResponse, UpdateAreaManagerRequest,
};
use crate::services::{area_managers, auth};

/// `POST /api/area-managers/manager-login`
pub async fn manager_login_handler(
    State(state): State<AppState>,
    body: Result<AppJson<LoginRequest>, AppError>,
) -> AppResult<Json<ManagerLoginResponse>> {
    // An unreadable body fails like bad credentials.
    let AppJson(body) = body.map_err(|_| AuthError::CredentialError)?;
    let resp = auth::manager_login(&state, body).await?;
    Ok(Json(resp))
}

/// `GET /api/area-managers`
pub async fn list_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<Vec<AreaManagerInfo>>> {
    Ok(Json(area_managers::list(&state, &principal).await?))
}

/// `POST /api/area-managers`
pub async fn create_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    AppJson(body): AppJson<CreateAreaManagerRequest>,
) -> AppResult<(StatusCode, Json<AreaManagerInfo>)> {
    let manager = area_managers::create(&state, &principal, body).await?;
    Ok((StatusCode::CREATED, Json(manager)))
}

/// `GET /api/area-managers/{nic}`
pub async fn get_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    Path(nic): Path<String>,
) -> AppResult<Json<AreaManagerInfo>> {
    Ok(Json(area_managers::get(&state, &principal, &nic).await?))
}

/// `PUT /api/area-managers/{nic}`
pub async fn update_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    Path(nic): Path<String>,
    AppJson(body): AppJson<UpdateAreaManagerRequest>,
) -> AppResult<Json<AreaManagerInfo>> {
    Ok(Json(
        area_managers::update(&state, &principal, &nic, body).await?,
    ))
}

/// `DELETE /api/area-managers/{nic}`
pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    Path(nic): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(area_managers::delete(&state, &principal, &nic).await?))
}
