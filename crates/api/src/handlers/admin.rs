//! Admin-only user management.

use axum::extract::{Path, Query, State};
use axum::Json;
use estate_core::error::CoreError;
use estate_core::roles::is_known_role;
use estate_core::types::DbId;
use estate_db::models::user::UserResponse;
use estate_db::repositories::UserRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (limit, offset) = params.resolve();
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn update_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if !is_known_role(&input.role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role '{}'",
            input.role
        ))));
    }
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot change their own role".into(),
        )));
    }

    let user = UserRepo::update_role(&state.pool, id, &input.role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    tracing::info!(user_id = id, role = %user.role, by = admin.user_id, "User role changed");

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
