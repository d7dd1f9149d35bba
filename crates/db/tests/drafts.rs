//! Integration tests for draft persistence.

use assert_matches::assert_matches;
use estate_core::draft::restore_wizard;
use estate_core::listing::ListingKind;
use estate_core::locale::Locale;
use estate_core::wizard::submission::prepare_submission;
use estate_db::models::user::CreateUser;
use estate_db::repositories::{CreatedListing, DraftRepo, SubmissionRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role: "agent".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn complete_land() -> serde_json::Value {
    json!({
        "title": "Lote en Cieneguilla",
        "price": 90000,
        "operation": "sale",
        "land_use": "residential",
        "address": "Km 12 Av. Nueva Toledo",
        "city": "Lima",
        "area_m2": 1000,
        "images": ["https://cdn.example.com/l.jpg"],
    })
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_then_load_reproduces_snapshot(pool: PgPool) {
    let owner = seed_user(&pool, "ana").await;
    let form = json!({ "title": "Casa en la playa", "bedrooms": "3" });

    let id = Uuid::now_v7();
    DraftRepo::create(&pool, id, "property", &form, 2, owner).await.unwrap();

    let loaded = DraftRepo::find_for_owner(&pool, id, owner).await.unwrap().unwrap();
    assert_eq!(loaded.form_data, form);
    assert_eq!(loaded.current_step, 2);

    let wizard = restore_wizard(loaded.id, &loaded.kind, loaded.form_data, loaded.current_step)
        .unwrap();
    assert_eq!(wizard.kind, ListingKind::Property);
    assert_eq!(wizard.current_step, 2);
    assert!(!wizard.is_dirty);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_overwrites_and_bumps_updated_at(pool: PgPool) {
    let owner = seed_user(&pool, "ana").await;
    let id = Uuid::now_v7();
    let created = DraftRepo::create(&pool, id, "post", &json!({}), 1, owner).await.unwrap();

    let updated = DraftRepo::update(&pool, id, owner, &json!({ "title": "Guía" }), 2)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.form_data["title"], "Guía");
    assert_eq!(updated.current_step, 2);
    assert!(updated.updated_at >= created.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_users_drafts_are_invisible(pool: PgPool) {
    let owner = seed_user(&pool, "ana").await;
    let intruder = seed_user(&pool, "beto").await;
    let id = Uuid::now_v7();
    DraftRepo::create(&pool, id, "land", &json!({}), 1, owner).await.unwrap();

    assert!(DraftRepo::find_for_owner(&pool, id, intruder).await.unwrap().is_none());
    assert!(DraftRepo::update(&pool, id, intruder, &json!({}), 1).await.unwrap().is_none());
    assert!(!DraftRepo::delete(&pool, id, intruder).await.unwrap());
    assert!(DraftRepo::find_for_owner(&pool, id, owner).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summaries_are_newest_first(pool: PgPool) {
    let owner = seed_user(&pool, "ana").await;
    let first = Uuid::now_v7();
    let second = Uuid::now_v7();
    DraftRepo::create(&pool, first, "property", &json!({ "title": "Primera" }), 1, owner)
        .await
        .unwrap();
    DraftRepo::create(&pool, second, "land", &json!({}), 3, owner).await.unwrap();
    // Touch the first draft so it becomes the most recent.
    DraftRepo::update(&pool, first, owner, &json!({ "title": "Primera v2" }), 2)
        .await
        .unwrap();

    let rows = DraftRepo::list_summaries(&pool, owner, None, 10, 0).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, first);
    assert_eq!(rows[0].title.as_deref(), Some("Primera v2"));
    assert_eq!(rows[1].title, None);

    let lands = DraftRepo::list_summaries(&pool, owner, Some("land"), 10, 0).await.unwrap();
    assert_eq!(lands.len(), 1);
    assert_eq!(DraftRepo::count_for_owner(&pool, owner, None).await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_creates_listing_and_removes_draft(pool: PgPool) {
    let owner = seed_user(&pool, "ana").await;
    let id = Uuid::now_v7();
    DraftRepo::create(&pool, id, "land", &complete_land(), 4, owner).await.unwrap();

    let payload = prepare_submission(
        ListingKind::Land,
        complete_land().as_object().unwrap(),
        Locale::Es,
    )
    .unwrap();
    let created = SubmissionRepo::submit_draft(&pool, id, owner, &payload)
        .await
        .unwrap()
        .unwrap();

    assert_matches!(&created, CreatedListing::Land(l) if l.status == "published" && l.currency == "USD");
    assert_eq!(created.slug(), "lote-en-cieneguilla");
    assert!(DraftRepo::find_for_owner(&pool, id, owner).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_of_missing_draft_writes_nothing(pool: PgPool) {
    let owner = seed_user(&pool, "ana").await;
    let payload = prepare_submission(
        ListingKind::Land,
        complete_land().as_object().unwrap(),
        Locale::Es,
    )
    .unwrap();

    let result = SubmissionRepo::submit_draft(&pool, Uuid::now_v7(), owner, &payload)
        .await
        .unwrap();
    assert!(result.is_none());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lands")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
