//! Route definitions for the agent dashboard.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{lands, posts, properties};
use crate::state::AppState;

/// Routes mounted at `/dashboard` (agent or admin).
///
/// ```text
/// GET    /properties               -> list_all
/// POST   /properties               -> create
/// GET    /properties/{id}          -> get_by_id
/// PUT    /properties/{id}          -> update
/// DELETE /properties/{id}          -> delete
/// PUT    /properties/{id}/status   -> update_status
///
/// (same for /lands)
///
/// GET    /posts                    -> list_all
/// POST   /posts                    -> create
/// GET    /posts/{id}               -> get_by_id
/// PUT    /posts/{id}               -> update
/// DELETE /posts/{id}               -> delete
/// PUT    /posts/{id}/publish       -> set_published
/// ```
pub fn router() -> Router<AppState> {
    let property_routes = Router::new()
        .route("/", get(properties::list_all).post(properties::create))
        .route(
            "/{id}",
            get(properties::get_by_id)
                .put(properties::update)
                .delete(properties::delete),
        )
        .route("/{id}/status", put(properties::update_status));

    let land_routes = Router::new()
        .route("/", get(lands::list_all).post(lands::create))
        .route(
            "/{id}",
            get(lands::get_by_id).put(lands::update).delete(lands::delete),
        )
        .route("/{id}/status", put(lands::update_status));

    let post_routes = Router::new()
        .route("/", get(posts::list_all).post(posts::create))
        .route(
            "/{id}",
            get(posts::get_by_id).put(posts::update).delete(posts::delete),
        )
        .route("/{id}/publish", put(posts::set_published));

    Router::new()
        .nest("/properties", property_routes)
        .nest("/lands", land_routes)
        .nest("/posts", post_routes)
}
