//! Address lookup for the wizard's location step.

use axum::extract::{Query, State};
use axum::Json;
use estate_core::geocoding::{normalize_query, GeocodeResult};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAgent;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub q: String,
}

/// GET /api/v1/geocode?q=
///
/// Never fails on the geocoder's account: an unconfigured, failing or
/// empty lookup answers with `confidence: 0`.
pub async fn geocode(
    RequireAgent(_user): RequireAgent,
    State(state): State<AppState>,
    Query(params): Query<GeocodeParams>,
) -> AppResult<Json<DataResponse<GeocodeResult>>> {
    let query = normalize_query(&params.q)?;
    let result = state.geocoder.lookup(&query).await;
    tracing::debug!(query = %query, resolved = result.is_resolved(), "Geocode lookup");
    Ok(Json(DataResponse { data: result }))
}
