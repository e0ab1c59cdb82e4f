//! PostgreSQL store tests. Skipped unless `TEST_DATABASE_URL` points at a
//! disposable database.

use chrono::{Duration, Utc};
use uuid::Uuid;
use wastewise_core::models::{GeoPoint, NewAreaManager, NewCitizen, NewComplaint, Progress, Role};
use wastewise_core::store::postgres::{PgStore, migrate};
use wastewise_core::store::{ComplaintStore, PrincipalStore, RevocationStore, StoreError};

async fn store() -> Option<PgStore> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return None;
    };
    let pool = sqlx::PgPool::connect(&url).await.expect("connect");
    migrate(&pool).await.expect("migrate");
    Some(PgStore::new(pool))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}

#[tokio::test]
async fn citizen_email_is_unique() {
    let Some(store) = store().await else { return };
    let email = format!("{}@x.io", unique("alice"));
    let new = |username: &str| NewCitizen {
        username: username.into(),
        email: email.clone(),
        password_hash: "hash".into(),
        role: Role::User,
        area: None,
    };

    let first = store.insert_citizen(new("alice")).await.unwrap();
    assert!(matches!(
        store.insert_citizen(new("impostor")).await,
        Err(StoreError::Conflict(_))
    ));

    let found = store.find_citizen_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.principal, first);
}

#[tokio::test]
async fn manager_update_and_delete() {
    let Some(store) = store().await else { return };
    let nic = unique("nic");
    let manager = store
        .insert_manager(NewAreaManager {
            nic: nic.clone(),
            first_name: "Nora".into(),
            last_name: "Reyes".into(),
            area: "North".into(),
            email: format!("{}@city.gov", unique("nora")),
            password_hash: "hash".into(),
        })
        .await
        .unwrap();

    let updated = store
        .update_manager(
            &nic,
            wastewise_core::models::AreaManagerUpdate {
                area: Some("South".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.area, "South");
    assert_eq!(updated.first_name, "Nora");
    assert_eq!(store.find_manager(manager.id).await.unwrap().unwrap().area, "South");

    assert!(store.delete_manager(&nic).await.unwrap());
    assert!(!store.delete_manager(&nic).await.unwrap());
}

#[tokio::test]
async fn revocation_respects_expiry_and_is_idempotent() {
    let Some(store) = store().await else { return };
    let now = Utc::now();
    let live = unique("live");
    let dead = unique("dead");

    store.insert_revoked(&live, now + Duration::hours(1)).await.unwrap();
    store.insert_revoked(&live, now + Duration::hours(1)).await.unwrap();
    store.insert_revoked(&dead, now - Duration::seconds(1)).await.unwrap();

    assert!(store.is_revoked(&live, now).await.unwrap());
    assert!(!store.is_revoked(&dead, now).await.unwrap());

    assert!(store.purge_revoked(now).await.unwrap() >= 1);
    assert!(store.is_revoked(&live, now).await.unwrap());
}

#[tokio::test]
async fn duplicate_revocation_keeps_later_expiry() {
    let Some(store) = store().await else { return };
    let now = Utc::now();
    let digest = unique("dup");

    store.insert_revoked(&digest, now + Duration::seconds(60)).await.unwrap();
    store.insert_revoked(&digest, now + Duration::seconds(5)).await.unwrap();
    assert!(store.is_revoked(&digest, now + Duration::seconds(30)).await.unwrap());

    store.insert_revoked(&digest, now + Duration::seconds(120)).await.unwrap();
    assert!(store.is_revoked(&digest, now + Duration::seconds(90)).await.unwrap());
}

#[tokio::test]
async fn progress_update_is_confined_to_area() {
    let Some(store) = store().await else { return };
    let complaint = store
        .insert_complaint(NewComplaint {
            username: "alice".into(),
            email: format!("{}@x.io", unique("alice")),
            description: "bin".into(),
            location: GeoPoint { lat: 6.9, lng: 79.8 },
            area: unique("area"),
            waste_type: "plastic".into(),
            image: None,
        })
        .await
        .unwrap();

    assert!(
        store
            .set_progress(complaint.id, Progress::Resolved, Some("elsewhere"))
            .await
            .unwrap()
            .is_none()
    );
    let updated = store
        .set_progress(complaint.id, Progress::InProgress, Some(&complaint.area))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.progress, Progress::InProgress);
}
