//! Integration tests for complaint scoping, area managers and analytics.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::app;

fn emails(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|c| c["email"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn own_complaints_follow_token_identity() {
    let app = app();
    let alice = app.citizen("alice", "a@x.io", "pw123").await;
    let bob = app.citizen("bob", "b@x.io", "pw123").await;

    app.complaint(&alice, "North").await;
    app.complaint(&alice, "South").await;
    app.complaint(&bob, "North").await;

    let (status, body) = app.get("/api/complaints/my-complaints", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(emails(&body), vec!["a@x.io", "a@x.io"]);
    assert_eq!(body[0]["username"], "alice");
    assert_eq!(body[0]["status"], "pending");
    assert_eq!(body[0]["progress"], "Recorded");

    let (_, body) = app.get("/api/complaints/my-complaints", Some(&bob)).await;
    assert_eq!(emails(&body), vec!["b@x.io"]);
}

#[tokio::test]
async fn submitted_identity_comes_from_token_not_body() {
    let app = app();
    let alice = app.citizen("alice", "a@x.io", "pw123").await;

    let (status, body) = app
        .post(
            "/api/complaints",
            Some(&alice),
            json!({
                "description": "dumped tyres",
                "area": "North",
                "location": { "lat": 6.9, "lng": 79.8 },
                "wasteType": "rubber",
                "email": "victim@x.io",
                "username": "victim",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "a@x.io");
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn complaint_requires_fields_and_valid_location() {
    let app = app();
    let alice = app.citizen("alice", "a@x.io", "pw123").await;

    let (status, _) = app
        .post(
            "/api/complaints",
            Some(&alice),
            json!({ "description": "bin", "area": "North", "wasteType": "plastic" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/complaints",
            Some(&alice),
            json!({
                "description": "bin",
                "area": "North",
                "location": { "lat": 123.0, "lng": 0.0 },
                "wasteType": "plastic",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn manager_sees_only_accepted_complaints_in_own_area() {
    let app = app();
    let admin = app.admin().await;
    let north = app.manager(&admin, "N1", "nora@city.gov", "North").await;
    let alice = app.citizen("alice", "a@x.io", "pw123").await;

    let accepted_north = app.complaint(&alice, "North").await;
    let _pending_north = app.complaint(&alice, "North").await;
    let accepted_south = app.complaint(&alice, "South").await;

    for id in [&accepted_north, &accepted_south] {
        let (status, _) = app
            .patch(
                &format!("/api/complaints/{id}/status"),
                Some(&admin),
                json!({ "status": "accepted" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.get("/api/complaints/area", Some(&north)).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], accepted_north.as_str());
    assert_eq!(list[0]["area"], "North");
}

#[tokio::test]
async fn manager_of_empty_area_gets_empty_list() {
    let app = app();
    let admin = app.admin().await;
    let east = app.manager(&admin, "E1", "eve@city.gov", "East").await;
    let alice = app.citizen("alice", "a@x.io", "pw123").await;

    let id = app.complaint(&alice, "North").await;
    app.patch(
        &format!("/api/complaints/{id}/status"),
        Some(&admin),
        json!({ "status": "accepted" }),
    )
    .await;

    let (status, body) = app
        .get("/api/complaints/area?area=North", Some(&east))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn area_reassignment_takes_effect_without_new_token() {
    let app = app();
    let admin = app.admin().await;
    let manager = app.manager(&admin, "N1", "nora@city.gov", "North").await;
    let alice = app.citizen("alice", "a@x.io", "pw123").await;

    let south = app.complaint(&alice, "South").await;
    app.patch(
        &format!("/api/complaints/{south}/status"),
        Some(&admin),
        json!({ "status": "accepted" }),
    )
    .await;

    let (status, _) = app
        .put(
            "/api/area-managers/N1",
            Some(&admin),
            json!({ "area": "South" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/complaints/area", Some(&manager)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["area"], "South");
}

#[tokio::test]
async fn progress_updates_are_area_scoped_for_managers() {
    let app = app();
    let admin = app.admin().await;
    let north = app.manager(&admin, "N1", "nora@city.gov", "North").await;
    let alice = app.citizen("alice", "a@x.io", "pw123").await;

    let in_area = app.complaint(&alice, "North").await;
    let elsewhere = app.complaint(&alice, "South").await;

    let (status, body) = app
        .patch(
            &format!("/api/complaints/{in_area}/progress"),
            Some(&north),
            json!({ "progress": "In Progress" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"], "In Progress");

    let (status, _) = app
        .patch(
            &format!("/api/complaints/{elsewhere}/progress"),
            Some(&north),
            json!({ "progress": "Resolved" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Administrators are not area bound.
    let (status, body) = app
        .patch(
            &format!("/api/complaints/{elsewhere}/progress"),
            Some(&admin),
            json!({ "progress": "Resolved" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"], "Resolved");
}

#[tokio::test]
async fn invalid_status_and_progress_are_rejected() {
    let app = app();
    let admin = app.admin().await;
    let alice = app.citizen("alice", "a@x.io", "pw123").await;
    let id = app.complaint(&alice, "North").await;

    for status in ["pending", "Accepted", "done"] {
        let (code, _) = app
            .patch(
                &format!("/api/complaints/{id}/status"),
                Some(&admin),
                json!({ "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::BAD_REQUEST, "{status}");
    }

    let (code, _) = app
        .patch(
            &format!("/api/complaints/{id}/progress"),
            Some(&admin),
            json!({ "progress": "in progress" }),
        )
        .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);

    let (code, _) = app
        .patch(
            "/api/complaints/not-an-id/status",
            Some(&admin),
            json!({ "status": "accepted" }),
        )
        .await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn citizens_are_forbidden_from_admin_operations() {
    let app = app();
    let alice = app.citizen("alice", "a@x.io", "pw123").await;
    let id = app.complaint(&alice, "North").await;

    for uri in [
        "/api/complaints",
        "/api/complaints/area",
        "/api/area-managers",
        "/api/analytics/complaints-by-area-detailed",
        "/api/analytics/complaints-by-status",
        "/api/analytics/complaints-by-progress",
    ] {
        let (status, body) = app.get(uri, Some(&alice)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"], "forbidden");
    }

    let (status, _) = app
        .patch(
            &format!("/api/complaints/{id}/status"),
            Some(&alice),
            json!({ "status": "accepted" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .patch(
            &format!("/api/complaints/{id}/progress"),
            Some(&alice),
            json!({ "progress": "Resolved" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn managers_are_forbidden_from_admin_operations() {
    let app = app();
    let admin = app.admin().await;
    let manager = app.manager(&admin, "N1", "nora@city.gov", "North").await;

    for uri in [
        "/api/complaints",
        "/api/area-managers",
        "/api/analytics/complaints-by-status",
    ] {
        let (status, _) = app.get(uri, Some(&manager)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn area_manager_administration() {
    let app = app();
    let admin = app.admin().await;
    app.manager(&admin, "N1", "nora@city.gov", "North").await;

    // NIC and email are unique among managers.
    let (status, body) = app
        .post(
            "/api/area-managers",
            Some(&admin),
            json!({
                "nic": "N1",
                "firstName": "Other",
                "lastName": "Person",
                "area": "West",
                "email": "other@city.gov",
                "password": "pw",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");

    let (status, body) = app.get("/api/area-managers", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.get("/api/area-managers/N1", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Nora");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    // Password updates are re-hashed and usable for login.
    let (status, _) = app
        .put(
            "/api/area-managers/N1",
            Some(&admin),
            json!({ "password": "rotated" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post(
            "/api/area-managers/manager-login",
            None,
            json!({ "email": "nora@city.gov", "password": "rotated" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/area-managers/X9", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .put("/api/area-managers/X9", Some(&admin), json!({ "area": "East" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/area-managers/N1", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete("/api/area-managers/N1", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analytics_aggregate_all_complaints() {
    let app = app();
    let admin = app.admin().await;
    let alice = app.citizen("alice", "a@x.io", "pw123").await;

    let n1 = app.complaint(&alice, "North").await;
    app.complaint(&alice, "North").await;
    let s1 = app.complaint(&alice, "South").await;

    app.patch(
        &format!("/api/complaints/{n1}/status"),
        Some(&admin),
        json!({ "status": "rejected" }),
    )
    .await;
    app.patch(
        &format!("/api/complaints/{s1}/progress"),
        Some(&admin),
        json!({ "progress": "Resolved" }),
    )
    .await;

    let (status, body) = app
        .get("/api/analytics/complaints-by-area-detailed", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "area": "North", "totalComplaints": 2, "pendingComplaints": 1, "rejectedComplaints": 1 },
            { "area": "South", "totalComplaints": 1, "pendingComplaints": 1, "rejectedComplaints": 0 },
        ])
    );

    let (_, body) = app
        .get("/api/analytics/complaints-by-status", Some(&admin))
        .await;
    assert_eq!(
        body,
        json!([
            { "status": "pending", "count": 2 },
            { "status": "rejected", "count": 1 },
        ])
    );

    let (_, body) = app
        .get("/api/analytics/complaints-by-progress", Some(&admin))
        .await;
    assert_eq!(
        body,
        json!([
            { "progress": "Recorded", "count": 2 },
            { "progress": "Resolved", "count": 1 },
        ])
    );

    let (status, body) = app.get("/api/complaints", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}
