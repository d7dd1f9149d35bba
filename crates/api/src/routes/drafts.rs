//! Route definitions for listing wizard drafts.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::drafts;
use crate::state::AppState;

/// Routes mounted at `/drafts`.
///
/// ```text
/// GET    /                            -> list
/// POST   /                            -> save (create or overwrite)
/// GET    /{id}                        -> get_by_id
/// DELETE /{id}                        -> delete
/// PATCH  /{id}/form-data              -> update_form_data
/// PUT    /{id}/step                   -> set_step
/// POST   /{id}/next                   -> next_step
/// POST   /{id}/previous               -> previous_step
/// POST   /{id}/validate               -> validate (?all=true)
/// POST   /{id}/submit                 -> submit
/// POST   /{id}/generate-description   -> generate_description
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(drafts::list).post(drafts::save))
        .route("/{id}", get(drafts::get_by_id).delete(drafts::delete))
        .route("/{id}/form-data", patch(drafts::update_form_data))
        .route("/{id}/step", put(drafts::set_step))
        .route("/{id}/next", post(drafts::next_step))
        .route("/{id}/previous", post(drafts::previous_step))
        .route("/{id}/validate", post(drafts::validate))
        .route("/{id}/submit", post(drafts::submit))
        .route(
            "/{id}/generate-description",
            post(drafts::generate_description),
        )
}
