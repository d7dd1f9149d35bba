//! Multipart image uploads for listing media.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use estate_core::error::CoreError;
use estate_core::upload::{validate_image, MAX_FILES_PER_REQUEST};

use crate::error::{AppError, AppResult};
use crate::integrations::storage::StoredImage;
use crate::middleware::rbac::RequireAgent;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/uploads
///
/// Every part carrying a filename is treated as an image. The whole batch
/// is validated before anything is written, and a failed write removes the
/// files already stored for the batch.
pub async fn upload_images(
    RequireAgent(user): RequireAgent,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<StoredImage>>>)> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if files.len() == MAX_FILES_PER_REQUEST {
            return Err(AppError::Core(CoreError::Validation(format!(
                "At most {MAX_FILES_PER_REQUEST} files per upload"
            ))));
        }
        let bytes = field.bytes().await?;
        let format = validate_image(&filename, &bytes, state.images.max_bytes())?;
        files.push((format, bytes));
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files in upload".into()));
    }

    let stored = state
        .images
        .save_all(&files)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;
    tracing::info!(count = stored.len(), user_id = user.user_id, "Images uploaded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
}
