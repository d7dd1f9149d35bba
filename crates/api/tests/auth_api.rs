//! HTTP-level integration tests for auth, profile and admin endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, put_json_auth, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Login / register
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_token_and_user(pool: PgPool) {
    let user = common::create_user(&pool, "loginuser", "agent").await;
    let app = common::build_test_app(pool);

    let body = json!({ "username": "loginuser", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "agent");
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_wrong_password_is_401(pool: PgPool) {
    common::create_user(&pool, "wrongpw", "agent").await;
    let app = common::build_test_app(pool);

    let body = json!({ "username": "wrongpw", "password": "incorrect_password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn nul_in_credentials_is_rejected_before_the_database(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = json!({ "username": "ana\0", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let body = json!({
        "username": "ana",
        "email": "ana\0@example.com",
        "password": "s3cret-pass",
    });
    let response = post_json(app, "/api/v1/auth/register?lang=en", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["email"][0], "Contains unsupported characters");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_viewer(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = json!({
        "username": "nueva",
        "email": "Nueva@Example.com",
        "password": "s3cret-pass",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["user"]["role"], "viewer");
    assert_eq!(json["user"]["email"], "nueva@example.com");

    // Same username again conflicts on uq_users_username.
    let app = common::build_test_app(pool);
    let body = json!({
        "username": "nueva",
        "email": "other@example.com",
        "password": "s3cret-pass",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_reports_field_errors_in_spanish_by_default(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "username": "ab", "email": "nope", "password": "short" });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["username"][0], "Debe tener al menos 3 caracteres");
    assert!(json["fields"]["email"].is_array());
    assert!(json["fields"]["password"].is_array());
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/users/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_keeps_omitted_fields(pool: PgPool) {
    let user = common::create_user(&pool, "perfil", "viewer").await;
    let token = common::token_for(&user);

    let app = common::build_test_app(pool.clone());
    let body = json!({ "display_name": " Ana Pérez ", "phone": "+51 999 888 777" });
    let response = put_json_auth(app, "/api/v1/users/me", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let body = json!({ "preferred_locale": "en" });
    put_json_auth(app, "/api/v1/users/me", body, &token).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/users/me", &token).await).await;
    assert_eq!(json["data"]["display_name"], "Ana Pérez");
    assert_eq!(json["data"]["phone"], "+51 999 888 777");
    assert_eq!(json["data"]["preferred_locale"], "en");

    let app = common::build_test_app(pool);
    let body = json!({ "preferred_locale": "fr" });
    let response = put_json_auth(app, "/api/v1/users/me?lang=en", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_admins_change_roles(pool: PgPool) {
    let admin = common::create_user(&pool, "jefa", "admin").await;
    let viewer = common::create_user(&pool, "visitante", "viewer").await;
    let admin_token = common::token_for(&admin);
    let viewer_token = common::token_for(&viewer);
    let uri = format!("/api/v1/admin/users/{}/role", viewer.id);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "role": "agent" }), &viewer_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "role": "owner" }), &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "role": "agent" }), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "agent");

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/admin/users", &admin_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
