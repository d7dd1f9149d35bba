//! Property listing entity model and DTOs.

use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `properties` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub operation: String,
    pub property_type: String,
    pub status: String,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub parking_spaces: Option<i32>,
    pub built_area_m2: Option<f64>,
    pub lot_area_m2: Option<f64>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub created_by_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public search filters. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct PropertyFilter {
    pub city: Option<String>,
    pub operation: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}
