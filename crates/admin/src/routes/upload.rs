//! Product image upload.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::services::upload::{self, MAX_IMAGE_BYTES, StoredImage, UploadError};
use crate::state::AppState;

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

/// Allowance for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the upload router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/upload/image", post(upload_image))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + MULTIPART_OVERHEAD))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(flatten)]
    pub image: StoredImage,
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge.into()
    } else {
        AppError::Validation(err.body_text())
    }
}

/// POST /api/upload/image
#[instrument(skip_all, fields(admin_id = %admin.id))]
async fn upload_image(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let extension = upload::image_extension(field.file_name(), field.content_type())?;
        let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
        let image =
            upload::store_product_image(&state.config().upload_dir, &extension, &bytes).await?;

        return Ok(Json(UploadResponse {
            success: true,
            message: "Image uploaded",
            image,
        }));
    }

    Err(UploadError::MissingFile.into())
}
