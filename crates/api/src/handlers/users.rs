//! Handlers for the signed-in user's own profile (`/users/me`).

use axum::extract::State;
use axum::Json;
use estate_core::accounts::validate_profile;
use estate_core::error::CoreError;
use estate_db::models::user::{UpdateProfile, UserResponse};
use estate_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::locale::RequestLocale;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/users/me
///
/// Omitted fields keep their current value.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Json(mut input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    trim_in_place(&mut input.display_name);
    trim_in_place(&mut input.phone);
    trim_in_place(&mut input.avatar_url);
    trim_in_place(&mut input.preferred_locale);

    validate_profile(
        input.display_name.as_deref(),
        input.phone.as_deref(),
        input.avatar_url.as_deref(),
        input.preferred_locale.as_deref(),
        locale,
    )
    .into_result()?;

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

fn trim_in_place(value: &mut Option<String>) {
    if let Some(v) = value {
        *v = v.trim().to_string();
    }
}
