//! Handlers for land listings: public search and the agent dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estate_core::error::CoreError;
use estate_core::listing::{
    validate_choice, validate_filter_text, validate_price_range, ListingKind, ListingStatus,
    LAND_USES, OPERATIONS,
};
use estate_core::types::DbId;
use estate_core::wizard::submission::ListingPayload;
use estate_db::models::land::{Land, LandFilter};
use estate_db::repositories::LandRepo;
use serde_json::Value;

use super::editing::{
    kind_mismatch, parse_status, payload_from_edit, payload_from_fields, CreateListingRequest,
    DashboardListParams, StatusRequest,
};
use crate::error::{AppError, AppResult};
use crate::middleware::locale::RequestLocale;
use crate::middleware::rbac::RequireAgent;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

const KIND: ListingKind = ListingKind::Land;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: KIND.entity_name(),
        id,
    })
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/lands
///
/// Published lands only, newest first.
pub async fn list_published(
    State(state): State<AppState>,
    Query(filter): Query<LandFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<Land>>> {
    if let Some(operation) = &filter.operation {
        validate_choice("operation", operation, OPERATIONS)?;
    }
    if let Some(land_use) = &filter.land_use {
        validate_choice("land_use", land_use, LAND_USES)?;
    }
    if let Some(city) = &filter.city {
        validate_filter_text("city", city)?;
    }
    validate_price_range(filter.min_price, filter.max_price)?;

    let (limit, offset) = page.resolve();
    let data = LandRepo::list_published(&state.pool, &filter, limit, offset).await?;
    let total = LandRepo::count_published(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/lands/{id}
pub async fn get_published(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Land>>> {
    let land = LandRepo::find_published(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: land }))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/dashboard/lands
pub async fn list_all(
    RequireAgent(_user): RequireAgent,
    State(state): State<AppState>,
    Query(params): Query<DashboardListParams>,
) -> AppResult<Json<DataResponse<Vec<Land>>>> {
    let status = params.status.as_deref().map(parse_status).transpose()?;
    let (limit, offset) = params.pagination().resolve();
    let data =
        LandRepo::list_all(&state.pool, status.map(|s| s.as_str()), limit, offset).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dashboard/lands/{id}
pub async fn get_by_id(
    RequireAgent(_user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Land>>> {
    let land = LandRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: land }))
}

/// POST /api/v1/dashboard/lands
pub async fn create(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Json(input): Json<CreateListingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Land>>)> {
    let status = match input.status.as_deref() {
        Some(s) => parse_status(s)?,
        None => ListingStatus::Draft,
    };
    let payload = payload_from_fields(KIND, &input.fields, locale)?;
    let ListingPayload::Land(listing) = &payload else {
        return Err(kind_mismatch(KIND, &payload));
    };

    let land =
        LandRepo::create(&state.pool, listing, status.as_str(), user.user_id).await?;
    tracing::info!(
        land_id = land.id,
        slug = %land.slug,
        user_id = user.user_id,
        "Land created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: land })))
}

/// PUT /api/v1/dashboard/lands/{id}
///
/// Partial body; the merged listing must still pass every wizard step.
pub async fn update(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<DbId>,
    Json(changes): Json<Value>,
) -> AppResult<Json<DataResponse<Land>>> {
    let current = LandRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let payload = payload_from_edit(KIND, &current, changes, locale)?;
    let ListingPayload::Land(listing) = &payload else {
        return Err(kind_mismatch(KIND, &payload));
    };

    let land = LandRepo::update(&state.pool, id, listing)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(land_id = id, user_id = user.user_id, "Land updated");

    Ok(Json(DataResponse { data: land }))
}

/// PUT /api/v1/dashboard/lands/{id}/status
pub async fn update_status(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<Land>>> {
    let status = parse_status(&input.status)?;
    let land = LandRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        land_id = id,
        status = status.as_str(),
        user_id = user.user_id,
        "Land status changed"
    );

    Ok(Json(DataResponse { data: land }))
}

/// DELETE /api/v1/dashboard/lands/{id}
pub async fn delete(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if LandRepo::delete(&state.pool, id).await? {
        tracing::info!(land_id = id, user_id = user.user_id, "Land deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
