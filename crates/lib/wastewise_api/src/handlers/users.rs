//! Citizen account handlers.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use wastewise_core::auth::AuthError;
use wastewise_core::auth::gate::bearer_token;
use wastewise_core::auth::policy::{Operation, authorize};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::{AuthenticatedPrincipal, authorization};
use crate::models::{
    ChangePasswordRequest, CitizenAuthResponse, LoginRequest, MessageResponse, ProfileResponse,
    SignupRequest,
};
use crate::services::auth;

/// `POST /api/users/signup` — register a citizen and log them in.
pub async fn signup_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<CitizenAuthResponse>)> {
    let resp = auth::signup(&state, body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /api/users/login` — citizen or admin login.
pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<AppJson<LoginRequest>, AppError>,
) -> AppResult<Json<CitizenAuthResponse>> {
    // An unreadable body fails like bad credentials.
    let AppJson(body) = body.map_err(|_| AuthError::CredentialError)?;
    let resp = auth::login(&state, body).await?;
    Ok(Json(resp))
}

/// `POST /api/users/logout` — revoke the presented bearer token, if any.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<MessageResponse>> {
    let token = bearer_token(authorization(&headers)).ok();
    let resp = auth::logout(&state, token).await?;
    Ok(Json(resp))
}

/// `GET /api/users/me` — profile of the authenticated principal.
pub async fn me_handler(
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<ProfileResponse>> {
    authorize(&principal, Operation::ViewOwnProfile)?;
    Ok(Json(principal.into()))
}

/// `PUT /api/users/me/password` — change the calling citizen's password.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    AppJson(body): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::change_password(&state, &principal, body).await?;
    Ok(Json(resp))
}
