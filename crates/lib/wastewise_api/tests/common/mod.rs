//! Shared helpers: router over the in-memory store, JSON request driver.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use wastewise_api::{AppState, config::ApiConfig, router};
use wastewise_core::auth::bootstrap::ensure_admin;
use wastewise_core::store::Stores;

pub const ADMIN_EMAIL: &str = "admin@city.gov";
pub const ADMIN_PASSWORD: &str = "admin-pw";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn app() -> TestApp {
    app_with(ApiConfig::new("test-secret"))
}

pub fn app_with(config: ApiConfig) -> TestApp {
    let state = AppState::new(config, Stores::memory()).expect("app state");
    TestApp {
        router: router(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_raw(method, uri, token, body.map(|b| b.to_string()))
            .await
    }

    /// Send a body verbatim, valid JSON or not.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => req.body(Body::empty()),
        }
        .expect("request");

        let (status, _, json) = self.request(req).await;
        (status, json)
    }

    /// Drive a prepared request and keep the response headers.
    pub async fn request(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let resp = self.router.clone().oneshot(req).await.expect("response");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Sign up a citizen and return its token.
    pub async fn citizen(&self, username: &str, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/users/signup",
                None,
                json!({ "username": username, "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// Ensure the admin account exists and return a fresh admin token.
    pub async fn admin(&self) -> String {
        ensure_admin(
            self.state.stores.principals.as_ref(),
            "Admin",
            ADMIN_EMAIL,
            ADMIN_PASSWORD,
        )
        .await
        .expect("ensure admin");
        let (status, body) = self
            .post(
                "/api/users/login",
                None,
                json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// Create an area manager through the API and log it in.
    pub async fn manager(&self, admin: &str, nic: &str, email: &str, area: &str) -> String {
        let (status, body) = self
            .post(
                "/api/area-managers",
                Some(admin),
                json!({
                    "nic": nic,
                    "firstName": "Nora",
                    "lastName": "Reyes",
                    "area": area,
                    "email": email,
                    "password": "mgr-pw",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create manager failed: {body}");

        let (status, body) = self
            .post(
                "/api/area-managers/manager-login",
                None,
                json!({ "email": email, "password": "mgr-pw" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "manager login failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// File a complaint and return its id.
    pub async fn complaint(&self, token: &str, area: &str) -> String {
        let (status, body) = self
            .post(
                "/api/complaints",
                Some(token),
                json!({
                    "description": "overflowing bin",
                    "area": area,
                    "location": { "lat": 6.93, "lng": 79.85 },
                    "wasteType": "plastic",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "submit failed: {body}");
        body["id"].as_str().expect("id").to_string()
    }
}
