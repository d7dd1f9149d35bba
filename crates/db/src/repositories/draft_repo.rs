//! Repository for the `listing_drafts` table.
//!
//! Every read and write is scoped to the owning user: a draft that belongs
//! to someone else behaves exactly like one that does not exist.

use estate_core::types::{DbId, DraftId};
use sqlx::{PgConnection, PgPool};

use crate::models::draft::{DraftSummaryRow, ListingDraft};

/// Column list for `listing_drafts` queries.
const COLUMNS: &str = "id, kind, form_data, current_step, created_by_id, created_at, updated_at";

/// Provides persistence for wizard drafts.
pub struct DraftRepo;

impl DraftRepo {
    /// Insert a new draft under a caller-generated id.
    pub async fn create(
        pool: &PgPool,
        id: DraftId,
        kind: &str,
        form_data: &serde_json::Value,
        current_step: i32,
        owner_id: DbId,
    ) -> Result<ListingDraft, sqlx::Error> {
        let query = format!(
            "INSERT INTO listing_drafts (id, kind, form_data, current_step, created_by_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListingDraft>(&query)
            .bind(id)
            .bind(kind)
            .bind(form_data)
            .bind(current_step)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Overwrite a draft's snapshot. Last write wins.
    ///
    /// Returns `None` when the draft does not exist for `owner_id`.
    pub async fn update(
        pool: &PgPool,
        id: DraftId,
        owner_id: DbId,
        form_data: &serde_json::Value,
        current_step: i32,
    ) -> Result<Option<ListingDraft>, sqlx::Error> {
        let query = format!(
            "UPDATE listing_drafts SET form_data = $3, current_step = $4 \
             WHERE id = $1 AND created_by_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListingDraft>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(form_data)
            .bind(current_step)
            .fetch_optional(pool)
            .await
    }

    /// Find a draft owned by `owner_id`.
    pub async fn find_for_owner(
        pool: &PgPool,
        id: DraftId,
        owner_id: DbId,
    ) -> Result<Option<ListingDraft>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listing_drafts WHERE id = $1 AND created_by_id = $2"
        );
        sqlx::query_as::<_, ListingDraft>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Summaries of a user's drafts, most recently updated first.
    pub async fn list_summaries(
        pool: &PgPool,
        owner_id: DbId,
        kind: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DraftSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, DraftSummaryRow>(
            "SELECT id, kind, form_data->>'title' AS title, current_step, updated_at \
             FROM listing_drafts \
             WHERE created_by_id = $1 AND ($2::TEXT IS NULL OR kind = $2) \
             ORDER BY updated_at DESC, id DESC \
             LIMIT $3 OFFSET $4",
        )
        .bind(owner_id)
        .bind(kind)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count a user's drafts.
    pub async fn count_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        kind: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM listing_drafts \
             WHERE created_by_id = $1 AND ($2::TEXT IS NULL OR kind = $2)",
        )
        .bind(owner_id)
        .bind(kind)
        .fetch_one(pool)
        .await
    }

    /// Delete a draft. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DraftId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::delete_with(&mut conn, id, owner_id).await
    }

    /// Same as [`Self::delete`] on an existing connection or transaction.
    pub async fn delete_with(
        conn: &mut PgConnection,
        id: DraftId,
        owner_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM listing_drafts WHERE id = $1 AND created_by_id = $2")
                .bind(id)
                .bind(owner_id)
                .execute(&mut *conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
