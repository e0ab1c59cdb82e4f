//! Authentication middleware: runs the gate and injects the principal.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use wastewise_core::auth::gate::bearer_token;
use wastewise_core::models::Principal;

use crate::AppState;
use crate::error::AppError;

/// The principal resolved for this request, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub Principal);

/// Raw `Authorization` header value, if it is valid text.
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, runs the
/// authentication gate and injects [`AuthenticatedPrincipal`].
///
/// Any gate failure ends the request here; the handler never runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(authorization(request.headers()))?;

    let principal = state.authenticator.authenticate(token).await?;
    debug!(id = %principal.id(), role = %principal.role(), "request authenticated");

    request
        .extensions_mut()
        .insert(AuthenticatedPrincipal(principal));

    Ok(next.run(request).await)
}
