//! HTTP-level integration tests for listings, the agent dashboard, uploads
//! and geocoding.

mod common;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use common::{body_json, delete_auth, get, get_auth, post_json_auth, put_json_auth};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

fn property_fields(title: &str, city: &str, price: f64) -> Value {
    json!({
        "title": title,
        "price": price,
        "operation": "sale",
        "property_type": "apartment",
        "address": "Calle Los Pinos 456",
        "city": city,
        "images": ["https://cdn.example.com/depa.jpg"],
    })
}

async fn create_property(pool: &PgPool, token: &str, mut fields: Value, status: &str) -> Value {
    fields["status"] = json!(status);
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/dashboard/properties", fields, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn upload(pool: &PgPool, token: &str, files: &[(&str, &[u8])]) -> axum::http::Response<Body> {
    let boundary = "estate-test-boundary";
    let mut body = Vec::new();
    for (name, bytes) in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/uploads")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    common::build_test_app(pool.clone()).oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_create_defaults_to_draft_status(pool: PgPool) {
    let (agent, token) = common::agent(&pool, "agente").await;

    let app = common::build_test_app(pool.clone());
    let fields = property_fields("Depa en Miraflores", "Lima", 180000.0);
    let response = post_json_auth(app, "/api/v1/dashboard/properties", fields, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["slug"], "depa-en-miraflores");
    assert_eq!(json["data"]["created_by_id"], agent.id);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/properties/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publishing_makes_property_public(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let fields = property_fields("Depa en Miraflores", "Lima", 180000.0);
    let id = create_property(&pool, &token, fields, "draft").await["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/dashboard/properties/{id}/status");
    let response = put_json_auth(app, &uri, json!({ "status": "published" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/properties").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["id"], id);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "status": "archived" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/properties/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn public_search_filters_and_rejects_bad_filters(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let lima = property_fields("Depa en Lima", "Lima", 150000.0);
    let cusco = property_fields("Casa en Cusco", "Cusco", 90000.0);
    create_property(&pool, &token, lima, "published").await;
    create_property(&pool, &token, cusco, "published").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/properties?city=Cusco").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["city"], "Cusco");

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/properties?min_price=100000").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["title"], "Depa en Lima");

    for uri in [
        "/api/v1/properties?operation=lease",
        "/api/v1/properties?property_type=castle",
        "/api/v1/properties?min_price=500&max_price=100",
    ] {
        let app = common::build_test_app(pool.clone());
        assert_eq!(get(app, uri).await.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn incomplete_property_is_rejected(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;

    let app = common::build_test_app(pool);
    let body = json!({ "title": "Casa en la playa", "city": "Máncora" });
    let response = post_json_auth(app, "/api/v1/dashboard/properties", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["fields"]["price"].is_array());
    assert!(json["fields"]["address"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn nul_in_listing_text_is_rejected(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let mut body = property_fields("Depa en Miraflores", "Lima", 180000.0);
    body["address"] = json!("Calle\0 Los Pinos");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/dashboard/properties?lang=en", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["address"][0], "Contains unsupported characters");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_merges_and_revalidates(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let fields = property_fields("Depa en Miraflores", "Lima", 180000.0);
    let id = create_property(&pool, &token, fields, "draft").await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/dashboard/properties/{id}");

    let app = common::build_test_app(pool.clone());
    let changes = json!({ "price": 175000, "bedrooms": 2 });
    let response = put_json_auth(app, &uri, changes, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["price"], 175000.0);
    assert_eq!(json["data"]["bedrooms"], 2);
    assert_eq!(json["data"]["city"], "Lima");

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "price": -1 }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, &uri, &token).await).await;
    assert_eq!(json["data"]["price"], 175000.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_requires_agent_role(pool: PgPool) {
    let viewer = common::create_user(&pool, "visitante", "viewer").await;
    let token = common::token_for(&viewer);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/dashboard/properties", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/dashboard/lands").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_property(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let fields = property_fields("Depa en Miraflores", "Lima", 180000.0);
    let id = create_property(&pool, &token, fields, "published").await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/dashboard/properties/{id}");

    let app = common::build_test_app(pool.clone());
    assert_eq!(delete_auth(app, &uri, &token).await.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    assert_eq!(delete_auth(app, &uri, &token).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_titles_get_distinct_slugs(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let first = property_fields("Depa en Miraflores", "Lima", 180000.0);
    let second = property_fields("Depa en Miraflores", "Lima", 190000.0);

    let a = create_property(&pool, &token, first, "published").await;
    let b = create_property(&pool, &token, second, "published").await;
    assert_eq!(a["slug"], "depa-en-miraflores");
    assert_eq!(b["slug"], "depa-en-miraflores-2");
}

// ---------------------------------------------------------------------------
// Lands
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn land_lifecycle(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let body = json!({
        "title": "Lote en Cieneguilla",
        "price": 90000,
        "currency": "pen",
        "operation": "sale",
        "land_use": "agricultural",
        "address": "Km 12 Carretera Central",
        "city": "Lima",
        "area_m2": "1000",
        "has_utilities": "on",
        "images": ["https://cdn.example.com/lote.jpg"],
        "status": "published",
    });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/dashboard/lands", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["currency"], "PEN");
    assert_eq!(json["data"]["area_m2"], 1000.0);
    assert_eq!(json["data"]["has_utilities"], true);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/lands?land_use=agricultural").await).await;
    assert_eq!(json["total"], 1);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/lands/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn posts_are_public_only_when_published(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let body = json!({
        "title": "Guía para comprar en Lima",
        "body": "Todo lo que necesitas saber.",
        "tags": ["guías"],
    });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/dashboard/posts", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    let slug = json["data"]["slug"].as_str().unwrap().to_string();
    assert_eq!(slug, "guia-para-comprar-en-lima");
    assert_eq!(json["data"]["is_published"], false);

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/posts/{slug}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/dashboard/posts/{id}/publish");
    let response = put_json_auth(app, &uri, json!({ "published": true }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/posts/{slug}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_published"], true);
    assert!(json["data"]["published_at"].is_string());

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/posts?tag=gu%C3%ADas").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn post_edit_applies_publish_only_when_given(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;
    let body = json!({ "title": "Mercado de alquileres", "body": "Resumen del mes." });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/dashboard/posts", body, &token).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/dashboard/posts/{id}");

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "publish": true }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_published"], true);
    let published_at = json["data"]["published_at"].clone();
    assert!(published_at.is_string());

    let app = common::build_test_app(pool.clone());
    let changes = json!({ "body": "Resumen actualizado." });
    let response = put_json_auth(app, &uri, changes, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_published"], true);
    assert_eq!(json["data"]["published_at"], published_at);

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, &uri, json!({ "publish": "false" }), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_published"], false);
    assert_eq!(json["data"]["published_at"], published_at);
}

// ---------------------------------------------------------------------------
// Uploads and geocoding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_stores_images_and_rejects_other_files(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;

    let response = upload(&pool, &token, &[("fachada.png", PNG)]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let url = json["data"][0]["url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:3000/uploads/"));
    assert!(url.ends_with(".png"));
    assert_eq!(json["data"][0]["content_type"], "image/png");

    let response = upload(&pool, &token, &[("fachada.png", PNG), ("notas.txt", b"hola")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = upload(&pool, &token, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn geocode_without_provider_answers_unresolved(pool: PgPool) {
    let (_agent, token) = common::agent(&pool, "agente").await;

    let app = common::build_test_app(pool.clone());
    let uri = "/api/v1/geocode?q=Av.%20Larco%20123%2C%20Miraflores";
    let response = get_auth(app, uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["query"], "Av. Larco 123, Miraflores");
    assert_eq!(json["data"]["confidence"], 0.0);
    assert!(json["data"]["latitude"].is_null());

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/geocode?q=ab", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
