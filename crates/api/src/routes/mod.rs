pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod drafts;
pub mod health;
pub mod listings;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/register                                   register (public)
///
/// /users/me                                        get, update own profile
///
/// /admin/users                                     list (admin only)
/// /admin/users/{id}/role                           change role (admin only)
///
/// /properties, /properties/{id}                    public search, detail
/// /lands, /lands/{id}                              public search, detail
/// /posts, /posts/{slug}                            public blog
///
/// /dashboard/properties[/{id}[/status]]            agent CRUD
/// /dashboard/lands[/{id}[/status]]                 agent CRUD
/// /dashboard/posts[/{id}[/publish]]                agent CRUD
///
/// /drafts                                          list, save
/// /drafts/{id}                                     load, delete
/// /drafts/{id}/form-data                           partial update (PATCH)
/// /drafts/{id}/step|next|previous                  navigation
/// /drafts/{id}/validate                            validation report
/// /drafts/{id}/submit                              create listing
/// /drafts/{id}/generate-description                fill copy
///
/// /wizards/{kind}                                  step layout (public)
/// /geocode?q=                                      address lookup
/// /uploads                                         image upload (multipart)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .merge(listings::router())
        .nest("/dashboard", dashboard::router())
        .nest("/drafts", drafts::router())
        .route("/wizards/{kind}", get(handlers::drafts::describe_wizard))
        .route("/geocode", get(handlers::geocode::geocode))
        .route("/uploads", post(handlers::uploads::upload_images))
}
