//! Aggregate reporting for administrators.

use axum::extract::State;
use axum::{Extension, Json};
use wastewise_core::auth::policy::{Operation, authorize};
use wastewise_core::models::{ProgressCount, StatusCount};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedPrincipal;
use crate::models::AreaSummaryInfo;

/// `GET /api/analytics/complaints-by-area-detailed`
pub async fn by_area_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<Vec<AreaSummaryInfo>>> {
    authorize(&principal, Operation::ViewAnalytics)?;
    let summaries = state.stores.complaints.area_summaries().await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// `GET /api/analytics/complaints-by-status`
pub async fn by_status_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<Vec<StatusCount>>> {
    authorize(&principal, Operation::ViewAnalytics)?;
    Ok(Json(state.stores.complaints.status_counts().await?))
}

/// `GET /api/analytics/complaints-by-progress`
pub async fn by_progress_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<Vec<ProgressCount>>> {
    authorize(&principal, Operation::ViewAnalytics)?;
    Ok(Json(state.stores.complaints.progress_counts().await?))
}
