//! Request types and helpers shared by the dashboard listing handlers.
//!
//! Dashboard creates and edits go through the same step validators as the
//! wizard, so a listing can never be stored in a shape the wizard rejects.

use estate_core::error::CoreError;
use estate_core::listing::{ListingKind, ListingStatus};
use estate_core::locale::Locale;
use estate_core::wizard::into_form_data;
use estate_core::wizard::submission::{prepare_edit, prepare_submission, ListingPayload};
use estate_core::wizard::FormData;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Body of a dashboard create: the listing fields plus an optional status.
#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    /// Initial status (default: `draft`).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub fields: FormData,
}

/// Body of `PUT .../{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Query parameters for dashboard listings.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl DashboardListParams {
    pub fn pagination(&self) -> crate::query::PaginationParams {
        crate::query::PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

pub fn parse_status(status: &str) -> AppResult<ListingStatus> {
    Ok(ListingStatus::from_str_db(status)?)
}

/// Validate a full set of listing fields for `kind`.
pub fn payload_from_fields(
    kind: ListingKind,
    fields: &FormData,
    locale: Locale,
) -> AppResult<ListingPayload> {
    Ok(prepare_submission(kind, fields, locale)?)
}

/// Merge `changes` into a stored row and revalidate the result.
pub fn payload_from_edit<T: Serialize>(
    kind: ListingKind,
    row: &T,
    changes: Value,
    locale: Locale,
) -> AppResult<ListingPayload> {
    let current = serde_json::to_value(row)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize listing: {e}")))?;
    let current = into_form_data(current)?;
    Ok(prepare_edit(kind, current, changes, locale)?)
}

/// Error for a payload whose kind does not match the route.
pub fn kind_mismatch(expected: ListingKind, payload: &ListingPayload) -> AppError {
    AppError::Core(CoreError::Internal(format!(
        "Expected a {} payload, got {}",
        expected.as_str(),
        payload.kind().as_str()
    )))
}
