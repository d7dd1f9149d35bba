//! Handlers for blog posts: public reading and the agent dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estate_core::error::CoreError;
use estate_core::listing::{validate_filter_text, ListingKind};
use estate_core::types::DbId;
use estate_core::wizard::submission::ListingPayload;
use estate_core::wizard::FormData;
use estate_db::models::post::Post;
use estate_db::repositories::PostRepo;
use serde::Deserialize;
use serde_json::Value;

use super::editing::{kind_mismatch, payload_from_edit, payload_from_fields};
use crate::error::{AppError, AppResult};
use crate::middleware::locale::RequestLocale;
use crate::middleware::rbac::RequireAgent;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

const KIND: ListingKind = ListingKind::Post;

/// Query parameters for `GET /posts`.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    pub tag: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body of `PUT /dashboard/posts/{id}/publish`.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: KIND.entity_name(),
        id,
    })
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/posts
pub async fn list_published(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> AppResult<Json<DataResponse<Vec<Post>>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let tag = params.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());
    if let Some(tag) = tag {
        validate_filter_text("tag", tag)?;
    }

    let data = PostRepo::list_published(&state.pool, tag, limit, offset).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/posts/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = PostRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundByKey {
            entity: KIND.entity_name(),
            key: slug,
        }))?;
    Ok(Json(DataResponse { data: post }))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/dashboard/posts
pub async fn list_all(
    RequireAgent(_user): RequireAgent,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Post>>>> {
    let (limit, offset) = page.resolve();
    let data = PostRepo::list_all(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dashboard/posts/{id}
pub async fn get_by_id(
    RequireAgent(_user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/dashboard/posts
///
/// `"publish": true` in the body publishes immediately.
pub async fn create(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Json(fields): Json<FormData>,
) -> AppResult<(StatusCode, Json<DataResponse<Post>>)> {
    let payload = payload_from_fields(KIND, &fields, locale)?;
    let ListingPayload::Post(input) = &payload else {
        return Err(kind_mismatch(KIND, &payload));
    };

    let post = PostRepo::create(&state.pool, input, user.user_id).await?;
    tracing::info!(
        post_id = post.id,
        slug = %post.slug,
        published = post.is_published,
        user_id = user.user_id,
        "Post created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// PUT /api/v1/dashboard/posts/{id}
///
/// Partial body. A `publish` field publishes or unpublishes; omitted, the
/// publication state is kept.
pub async fn update(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<DbId>,
    Json(changes): Json<Value>,
) -> AppResult<Json<DataResponse<Post>>> {
    let current = PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let payload = payload_from_edit(KIND, &current, changes, locale)?;
    let ListingPayload::Post(input) = &payload else {
        return Err(kind_mismatch(KIND, &payload));
    };

    let post = PostRepo::update(&state.pool, id, input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(post_id = id, user_id = user.user_id, "Post updated");

    Ok(Json(DataResponse { data: post }))
}

/// PUT /api/v1/dashboard/posts/{id}/publish
pub async fn set_published(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PublishRequest>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = PostRepo::set_published(&state.pool, id, input.published)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        post_id = id,
        published = input.published,
        user_id = user.user_id,
        "Post publication changed"
    );

    Ok(Json(DataResponse { data: post }))
}

/// DELETE /api/v1/dashboard/posts/{id}
pub async fn delete(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if PostRepo::delete(&state.pool, id).await? {
        tracing::info!(post_id = id, user_id = user.user_id, "Post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
