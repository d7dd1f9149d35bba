//! Repository for the `posts` table.

use estate_core::types::DbId;
use estate_core::wizard::submission::PostListing;
use sqlx::{PgConnection, PgPool};

use super::slug::free_slug;
use crate::models::post::Post;

/// Column list for `posts` queries.
const COLUMNS: &str = "id, slug, title, excerpt, body, tags, cover_image, is_published, \
     published_at, author_id, created_at, updated_at";

/// Provides CRUD operations for blog posts.
pub struct PostRepo;

impl PostRepo {
    pub async fn create(
        pool: &PgPool,
        post: &PostListing,
        author_id: DbId,
    ) -> Result<Post, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_with(&mut conn, post, author_id).await
    }

    /// Insert a post. `publish = Some(true)` publishes it immediately.
    pub async fn create_with(
        conn: &mut PgConnection,
        post: &PostListing,
        author_id: DbId,
    ) -> Result<Post, sqlx::Error> {
        let slug = free_slug(conn, "posts", &post.title).await?;
        let publish = post.publish.unwrap_or(false);
        let query = format!(
            "INSERT INTO posts \
                (slug, title, excerpt, body, tags, cover_image, is_published, published_at, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $7 THEN NOW() END, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(&slug)
            .bind(&post.title)
            .bind(&post.excerpt)
            .bind(&post.body)
            .bind(&post.tags)
            .bind(&post.cover_image)
            .bind(publish)
            .bind(author_id)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a published post by slug.
    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE slug = $1 AND is_published");
        sqlx::query_as::<_, Post>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List published posts, most recently published first. `tag` narrows
    /// to posts carrying that tag.
    pub async fn list_published(
        pool: &PgPool,
        tag: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts \
             WHERE is_published AND ($1::TEXT IS NULL OR $1 = ANY(tags)) \
             ORDER BY published_at DESC NULLS LAST, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(tag)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List every post for the dashboard.
    pub async fn list_all(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts ORDER BY updated_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a post's content fields.
    ///
    /// Publication changes only when `post.publish` is set, with the same
    /// `published_at` rule as [`Self::set_published`].
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        post: &PostListing,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET \
                title = $2, excerpt = $3, body = $4, tags = $5, cover_image = $6, \
                is_published = COALESCE($7::BOOLEAN, is_published), \
                published_at = CASE WHEN COALESCE($7::BOOLEAN, is_published) \
                    THEN COALESCE(published_at, NOW()) ELSE published_at END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(&post.title)
            .bind(&post.excerpt)
            .bind(&post.body)
            .bind(&post.tags)
            .bind(&post.cover_image)
            .bind(post.publish)
            .fetch_optional(pool)
            .await
    }

    /// Publish or unpublish. `published_at` is set on the first publish
    /// and kept afterwards.
    pub async fn set_published(
        pool: &PgPool,
        id: DbId,
        published: bool,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET \
                is_published = $2, \
                published_at = CASE WHEN $2 THEN COALESCE(published_at, NOW()) ELSE published_at END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(published)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
