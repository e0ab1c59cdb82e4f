//! # wastewise_api
//!
//! HTTP API library for WasteWise.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use wastewise_core::auth::AuthError;
use wastewise_core::auth::gate::Authenticator;
use wastewise_core::auth::jwt::TokenService;
use wastewise_core::auth::revocation::RevocationRegistry;
use wastewise_core::store::Stores;

use crate::config::ApiConfig;
use crate::handlers::{analytics, area_managers, complaints, health, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage backends.
    pub stores: Stores,
    /// Token issuance and verification.
    pub tokens: Arc<TokenService>,
    /// Revocation registry over `stores.revocations`.
    pub revocations: RevocationRegistry,
    /// Authentication gate used by [`middleware::auth::require_auth`].
    pub authenticator: Authenticator,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Wire the auth core over the given stores.
    ///
    /// Fails when the signing secret is empty.
    pub fn new(config: ApiConfig, stores: Stores) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenService::new(
            config.jwt_secret.as_bytes(),
            config.token_ttls(),
        )?);
        let revocations =
            RevocationRegistry::new(stores.revocations.clone(), config.revocation_fallback);
        let authenticator = Authenticator::new(
            tokens.clone(),
            revocations.clone(),
            stores.principals.clone(),
            config.auth_lookup_timeout,
        );
        Ok(Self {
            stores,
            tokens,
            revocations,
            authenticator,
            config,
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let origins = &state.config.allowed_origins;
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().cloned())
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health))
        .route(routes::POST_USERS_SIGNUP, post(users::signup_handler))
        .route(routes::POST_USERS_LOGIN, post(users::login_handler))
        .route(routes::POST_USERS_LOGOUT, post(users::logout_handler))
        .route(
            routes::POST_AREA_MANAGERS_LOGIN,
            post(area_managers::manager_login_handler),
        );

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_USERS_ME, get(users::me_handler))
        .route(
            routes::PUT_USERS_ME_PASSWORD,
            put(users::change_password_handler),
        )
        .route(
            routes::AREA_MANAGERS,
            get(area_managers::list_handler).post(area_managers::create_handler),
        )
        .route(
            routes::AREA_MANAGERS_NIC,
            get(area_managers::get_handler)
                .put(area_managers::update_handler)
                .delete(area_managers::delete_handler),
        )
        .route(
            routes::COMPLAINTS,
            get(complaints::list_all_handler).post(complaints::submit_handler),
        )
        .route(routes::GET_COMPLAINTS_MINE, get(complaints::list_own_handler))
        .route(routes::GET_COMPLAINTS_AREA, get(complaints::list_area_handler))
        .route(
            routes::PATCH_COMPLAINTS_ID_STATUS,
            patch(complaints::review_handler),
        )
        .route(
            routes::PATCH_COMPLAINTS_ID_PROGRESS,
            patch(complaints::progress_handler),
        )
        .route(routes::GET_ANALYTICS_BY_AREA, get(analytics::by_area_handler))
        .route(
            routes::GET_ANALYTICS_BY_STATUS,
            get(analytics::by_status_handler),
        )
        .route(
            routes::GET_ANALYTICS_BY_PROGRESS,
            get(analytics::by_progress_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
