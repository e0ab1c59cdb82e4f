//! Health endpoint.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /api/health` — crate version and store connectivity.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_connected = match state.stores.principals.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("store ping failed: {e}");
            false
        }
    };

    Json(HealthResponse {
        version: wastewise_core::version().to_string(),
        store_connected,
    })
}
