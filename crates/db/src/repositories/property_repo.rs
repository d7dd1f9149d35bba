//! Repository for the `properties` table.

use estate_core::types::DbId;
use estate_core::wizard::submission::PropertyListing;
use sqlx::{PgConnection, PgPool};

use super::slug::free_slug;
use crate::models::property::{Property, PropertyFilter};

/// Column list for `properties` queries.
const COLUMNS: &str = "id, slug, title, description, price, currency, operation, property_type, \
     status, address, city, latitude, longitude, bedrooms, bathrooms, parking_spaces, \
     built_area_m2, lot_area_m2, amenities, images, created_by_id, created_at, updated_at";

/// Shared WHERE clause for public searches; `$1..$5` are the filter values.
const FILTER: &str = "status = 'published' \
       AND ($1::TEXT IS NULL OR lower(city) = lower($1)) \
       AND ($2::TEXT IS NULL OR operation = $2) \
       AND ($3::TEXT IS NULL OR property_type = $3) \
       AND ($4::FLOAT8 IS NULL OR price >= $4) \
       AND ($5::FLOAT8 IS NULL OR price <= $5)";

/// Provides CRUD operations for property listings.
pub struct PropertyRepo;

impl PropertyRepo {
    /// Insert a validated listing with a freshly allocated slug.
    pub async fn create(
        pool: &PgPool,
        listing: &PropertyListing,
        status: &str,
        created_by_id: DbId,
    ) -> Result<Property, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_with(&mut conn, listing, status, created_by_id).await
    }

    /// Same as [`Self::create`] on an existing connection or transaction.
    pub async fn create_with(
        conn: &mut PgConnection,
        listing: &PropertyListing,
        status: &str,
        created_by_id: DbId,
    ) -> Result<Property, sqlx::Error> {
        let slug = free_slug(conn, "properties", &listing.title).await?;
        let query = format!(
            "INSERT INTO properties \
                (slug, title, description, price, currency, operation, property_type, status, \
                 address, city, latitude, longitude, bedrooms, bathrooms, parking_spaces, \
                 built_area_m2, lot_area_m2, amenities, images, created_by_id) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'USD'), $6, $7, $8, $9, $10, $11, $12, \
                     $13, $14, $15, $16, $17, $18, $19, $20) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(&slug)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.price)
            .bind(&listing.currency)
            .bind(&listing.operation)
            .bind(&listing.property_type)
            .bind(status)
            .bind(&listing.address)
            .bind(&listing.city)
            .bind(listing.latitude)
            .bind(listing.longitude)
            .bind(listing.bedrooms)
            .bind(listing.bathrooms)
            .bind(listing.parking_spaces)
            .bind(listing.built_area_m2)
            .bind(listing.lot_area_m2)
            .bind(&listing.amenities)
            .bind(&listing.images)
            .bind(created_by_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a property by ID regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a published property by ID.
    pub async fn find_published(pool: &PgPool, id: DbId) -> Result<Option<Property>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM properties WHERE id = $1 AND status = 'published'");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Search published properties, newest first.
    pub async fn list_published(
        pool: &PgPool,
        filter: &PropertyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM properties WHERE {FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(&filter.city)
            .bind(&filter.operation)
            .bind(&filter.property_type)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count published properties matching `filter`.
    pub async fn count_published(
        pool: &PgPool,
        filter: &PropertyFilter,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM properties WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(&filter.city)
            .bind(&filter.operation)
            .bind(&filter.property_type)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_one(pool)
            .await
    }

    /// List every property (any status) for the dashboard.
    pub async fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM properties \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY updated_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a property's listing fields. Slug and status are kept.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        listing: &PropertyListing,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!(
            "UPDATE properties SET \
                title = $2, description = $3, price = $4, currency = COALESCE($5, currency), \
                operation = $6, property_type = $7, address = $8, city = $9, \
                latitude = $10, longitude = $11, bedrooms = $12, bathrooms = $13, \
                parking_spaces = $14, built_area_m2 = $15, lot_area_m2 = $16, \
                amenities = $17, images = $18 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.price)
            .bind(&listing.currency)
            .bind(&listing.operation)
            .bind(&listing.property_type)
            .bind(&listing.address)
            .bind(&listing.city)
            .bind(listing.latitude)
            .bind(listing.longitude)
            .bind(listing.bedrooms)
            .bind(listing.bathrooms)
            .bind(listing.parking_spaces)
            .bind(listing.built_area_m2)
            .bind(listing.lot_area_m2)
            .bind(&listing.amenities)
            .bind(&listing.images)
            .fetch_optional(pool)
            .await
    }

    /// Set the publication status.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("UPDATE properties SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a property. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
