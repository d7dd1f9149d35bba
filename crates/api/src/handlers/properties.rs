//! Handlers for property listings: public search and the agent dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estate_core::error::CoreError;
use estate_core::listing::{
    validate_choice, validate_filter_text, validate_price_range, ListingKind, ListingStatus,
    OPERATIONS, PROPERTY_TYPES,
};
use estate_core::types::DbId;
use estate_core::wizard::submission::ListingPayload;
use estate_db::models::property::{Property, PropertyFilter};
use estate_db::repositories::PropertyRepo;
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

const KIND: ListingKind = ListingKind::Property;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: KIND.entity_name(),
        id,
    })
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/properties
///
/// Published properties only, newest first.
pub async fn list_published(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<Property>>> {
    if let Some(operation) = &filter.operation {
        validate_choice("operation", operation, OPERATIONS)?;
    }
    if let Some(property_type) = &filter.property_type {
        validate_choice("property_type", property_type, PROPERTY_TYPES)?;
    }
    if let Some(city) = &filter.city {
        validate_filter_text("city", city)?;
    }
    validate_price_range(filter.min_price, filter.max_price)?;

    let (limit, offset) = page.resolve();
    let data = PropertyRepo::list_published(&state.pool, &filter, limit, offset).await?;
    let total = PropertyRepo::count_published(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/properties/{id}
pub async fn get_published(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Property>>> {
    let property = PropertyRepo::find_published(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: property }))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/dashboard/properties
pub async fn list_all(
    RequireAgent(_user): RequireAgent,
    State(state): State<AppState>,
    Query(params): Query<DashboardListParams>,
) -> AppResult<Json<DataResponse<Vec<Property>>>> {
    let status = params.status.as_deref().map(parse_status).transpose()?;
    let (limit, offset) = params.pagination().resolve();
    let data =
        PropertyRepo::list_all(&state.pool, status.map(|s| s.as_str()), limit, offset).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dashboard/properties/{id}
pub async fn get_by_id(
    RequireAgent(_user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Property>>> {
    let property = PropertyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: property }))
}

/// POST /api/v1/dashboard/properties
pub async fn create(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Json(input): Json<CreateListingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Property>>)> {
    let status = match input.status.as_deref() {
        Some(s) => parse_status(s)?,
        None => ListingStatus::Draft,
    };
    let payload = payload_from_fields(KIND, &input.fields, locale)?;
    let ListingPayload::Property(listing) = &payload else {
        return Err(kind_mismatch(KIND, &payload));
    };

    let property =
        PropertyRepo::create(&state.pool, listing, status.as_str(), user.user_id).await?;
    tracing::info!(
        property_id = property.id,
        slug = %property.slug,
        user_id = user.user_id,
        "Property created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: property })))
}

/// PUT /api/v1/dashboard/properties/{id}
///
/// Partial body; the merged listing must still pass every wizard step.
pub async fn update(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<DbId>,
    Json(changes): Json<Value>,
) -> AppResult<Json<DataResponse<Property>>> {
    let current = PropertyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let payload = payload_from_edit(KIND, &current, changes, locale)?;
    let ListingPayload::Property(listing) = &payload else {
        return Err(kind_mismatch(KIND, &payload));
    };

    let property = PropertyRepo::update(&state.pool, id, listing)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(property_id = id, user_id = user.user_id, "Property updated");

    Ok(Json(DataResponse { data: property }))
}

/// PUT /api/v1/dashboard/properties/{id}/status
pub async fn update_status(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<Property>>> {
    let status = parse_status(&input.status)?;
    let property = PropertyRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        property_id = id,
        status = status.as_str(),
        user_id = user.user_id,
        "Property status changed"
    );

    Ok(Json(DataResponse { data: property }))
}

/// DELETE /api/v1/dashboard/properties/{id}
pub async fn delete(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if PropertyRepo::delete(&state.pool, id).await? {
        tracing::info!(property_id = id, user_id = user.user_id, "Property deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
