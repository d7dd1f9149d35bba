//! Repository for the `lands` table.

use estate_core::types::DbId;
use estate_core::wizard::submission::LandListing;
use sqlx::{PgConnection, PgPool};

use super::slug::free_slug;
use crate::models::land::{Land, LandFilter};

/// Column list for `lands` queries.
const COLUMNS: &str = "id, slug, title, description, price, currency, operation, land_use, \
     status, address, city, latitude, longitude, area_m2, frontage_m, has_utilities, zoning, \
     images, created_by_id, created_at, updated_at";

const FILTER: &str = "status = 'published' \
       AND ($1::TEXT IS NULL OR lower(city) = lower($1)) \
       AND ($2::TEXT IS NULL OR operation = $2) \
       AND ($3::TEXT IS NULL OR land_use = $3) \
       AND ($4::FLOAT8 IS NULL OR price >= $4) \
       AND ($5::FLOAT8 IS NULL OR price <= $5)";

/// Provides CRUD operations for land listings.
pub struct LandRepo;

impl LandRepo {
    pub async fn create(
        pool: &PgPool,
        listing: &LandListing,
        status: &str,
        created_by_id: DbId,
    ) -> Result<Land, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_with(&mut conn, listing, status, created_by_id).await
    }

    pub async fn create_with(
        conn: &mut PgConnection,
        listing: &LandListing,
        status: &str,
        created_by_id: DbId,
    ) -> Result<Land, sqlx::Error> {
        let slug = free_slug(conn, "lands", &listing.title).await?;
        let query = format!(
            "INSERT INTO lands \
                (slug, title, description, price, currency, operation, land_use, status, \
                 address, city, latitude, longitude, area_m2, frontage_m, has_utilities, \
                 zoning, images, created_by_id) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'USD'), $6, $7, $8, $9, $10, $11, $12, \
                     $13, $14, $15, $16, $17, $18) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Land>(&query)
            .bind(&slug)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.price)
            .bind(&listing.currency)
            .bind(&listing.operation)
            .bind(&listing.land_use)
            .bind(status)
            .bind(&listing.address)
            .bind(&listing.city)
            .bind(listing.latitude)
            .bind(listing.longitude)
            .bind(listing.area_m2)
            .bind(listing.frontage_m)
            .bind(listing.has_utilities)
            .bind(&listing.zoning)
            .bind(&listing.images)
            .bind(created_by_id)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Land>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lands WHERE id = $1");
        sqlx::query_as::<_, Land>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_published(pool: &PgPool, id: DbId) -> Result<Option<Land>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lands WHERE id = $1 AND status = 'published'");
        sqlx::query_as::<_, Land>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Search published lands, newest first.
    pub async fn list_published(
        pool: &PgPool,
        filter: &LandFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Land>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lands WHERE {FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Land>(&query)
            .bind(&filter.city)
            .bind(&filter.operation)
            .bind(&filter.land_use)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_published(pool: &PgPool, filter: &LandFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM lands WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(&filter.city)
            .bind(&filter.operation)
            .bind(&filter.land_use)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_one(pool)
            .await
    }

    pub async fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Land>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lands \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY updated_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Land>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a land's listing fields. Slug and status are kept.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        listing: &LandListing,
    ) -> Result<Option<Land>, sqlx::Error> {
        let query = format!(
            "UPDATE lands SET \
                title = $2, description = $3, price = $4, currency = COALESCE($5, currency), \
                operation = $6, land_use = $7, address = $8, city = $9, \
                latitude = $10, longitude = $11, area_m2 = $12, frontage_m = $13, \
                has_utilities = $14, zoning = $15, images = $16 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Land>(&query)
            .bind(id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.price)
            .bind(&listing.currency)
            .bind(&listing.operation)
            .bind(&listing.land_use)
            .bind(&listing.address)
            .bind(&listing.city)
            .bind(listing.latitude)
            .bind(listing.longitude)
            .bind(listing.area_m2)
            .bind(listing.frontage_m)
            .bind(listing.has_utilities)
            .bind(&listing.zoning)
            .bind(&listing.images)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Land>, sqlx::Error> {
        let query = format!("UPDATE lands SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Land>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lands WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
