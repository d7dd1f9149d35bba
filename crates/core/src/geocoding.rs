//! Geocoding result model and query rules.
//!
//! The HTTP client lives in the API crate; this module defines what a
//! lookup returns and the fallback used whenever a lookup cannot resolve.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Shortest free-text query worth sending to a geocoder.
pub const MIN_QUERY_CHARS: usize = 3;

/// Longest query accepted.
pub const MAX_QUERY_CHARS: usize = 300;

/// Outcome of an address lookup.
///
/// `confidence` is 0.0 when nothing was resolved; coordinates are then
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub query: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub formatted_address: Option<String>,
    pub confidence: f64,
}

impl GeocodeResult {
    /// The zero-confidence answer returned instead of an error.
    pub fn unresolved(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            latitude: None,
            longitude: None,
            formatted_address: None,
            confidence: 0.0,
        }
    }

    /// Build a resolved result, falling back to [`Self::unresolved`] when the
    /// coordinates are not usable.
    pub fn resolved(
        query: impl Into<String>,
        latitude: f64,
        longitude: f64,
        formatted_address: Option<String>,
        confidence: f64,
    ) -> Self {
        let query = query.into();
        if !valid_coordinates(latitude, longitude) {
            return Self::unresolved(query);
        }
        Self {
            query,
            latitude: Some(latitude),
            longitude: Some(longitude),
            formatted_address,
            confidence: clamp_confidence(confidence),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.confidence > 0.0 && self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Trim and collapse whitespace; reject queries too short or too long.
pub fn normalize_query(raw: &str) -> Result<String, CoreError> {
    let query = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let len = query.chars().count();
    if len < MIN_QUERY_CHARS {
        return Err(CoreError::Validation(format!(
            "Address query must be at least {MIN_QUERY_CHARS} characters"
        )));
    }
    if len > MAX_QUERY_CHARS {
        return Err(CoreError::Validation(format!(
            "Address query must be at most {MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(query)
}

/// Force a confidence score into `0.0..=1.0`; NaN becomes 0.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

pub fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}
