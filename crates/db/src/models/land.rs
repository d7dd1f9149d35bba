//! Land listing entity model and DTOs.

use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lands` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Land {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub operation: String,
    pub land_use: String,
    pub status: String,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub area_m2: f64,
    pub frontage_m: Option<f64>,
    pub has_utilities: Option<bool>,
    pub zoning: Option<String>,
    pub images: Vec<String>,
    pub created_by_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Default, Deserialize)]
pub struct LandFilter {
    pub city: Option<String>,
    pub operation: Option<String>,
    pub land_use: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}
