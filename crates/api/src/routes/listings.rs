//! Route definitions for public listing pages.

use axum::routing::get;
use axum::Router;

use crate::handlers::{lands, posts, properties};
use crate::state::AppState;

/// Public routes, no authentication.
///
/// ```text
/// GET  /properties        -> properties::list_published
/// GET  /properties/{id}   -> properties::get_published
/// GET  /lands             -> lands::list_published
/// GET  /lands/{id}        -> lands::get_published
/// GET  /posts             -> posts::list_published
/// GET  /posts/{slug}      -> posts::get_by_slug
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/properties", get(properties::list_published))
        .route("/properties/{id}", get(properties::get_published))
        .route("/lands", get(lands::list_published))
        .route("/lands/{id}", get(lands::get_published))
        .route("/posts", get(posts::list_published))
        .route("/posts/{slug}", get(posts::get_by_slug))
}
