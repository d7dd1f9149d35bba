//! Slug allocation shared by the listing repositories.

use estate_core::listing::{pick_free_slug, slugify};
use sqlx::PgConnection;

/// Pick an unused slug for `title` in `table`.
///
/// Two concurrent inserts can still race to the same slug; the loser hits
/// the table's `uq_*_slug` constraint.
pub(crate) async fn free_slug(
    conn: &mut PgConnection,
    table: &'static str,
    title: &str,
) -> Result<String, sqlx::Error> {
    let base = slugify(title);
    let query = format!("SELECT slug FROM {table} WHERE slug = $1 OR slug LIKE $2");
    let taken: Vec<String> = sqlx::query_scalar(&query)
        .bind(&base)
        .bind(format!("{base}-%"))
        .fetch_all(&mut *conn)
        .await?;
    Ok(pick_free_slug(&base, &taken))
}
