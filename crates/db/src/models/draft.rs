//! Listing wizard draft model and DTOs.

use estate_core::types::{DbId, DraftId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `listing_drafts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ListingDraft {
    pub id: DraftId,
    pub kind: String,
    pub form_data: serde_json::Value,
    pub current_step: i32,
    pub created_by_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for saving a draft.
///
/// Without `id` a new draft is created; with one, that draft is overwritten.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveDraft {
    pub id: Option<DraftId>,
    pub kind: String,
    pub form_data: serde_json::Value,
    pub current_step: i32,
}

/// Lightweight row for draft listings.
#[derive(Debug, Clone, FromRow)]
pub struct DraftSummaryRow {
    pub id: DraftId,
    pub kind: String,
    pub title: Option<String>,
    pub current_step: i32,
    pub updated_at: Timestamp,
}
