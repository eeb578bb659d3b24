//! Product image storage on the local filesystem.
//!
//! Files land in `<upload_dir>/products/product-<uuid>.<ext>` and are served
//! back under `/uploads/products/`.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image types; the extension and the MIME subtype must both be one of these.
const IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Subdirectory of the upload root holding product images.
const PRODUCT_DIR: &str = "products";

/// Upload failures.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no image file provided")]
    MissingFile,

    #[error("only image files (jpeg, jpg, png, gif, webp) are allowed")]
    UnsupportedType,

    #[error("image exceeds the {} MB limit", MAX_IMAGE_BYTES / (1024 * 1024))]
    TooLarge,

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    /// Public path of the image.
    pub url: String,
    pub filename: String,
}

/// Normalized extension of an acceptable image upload.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedType` unless both the file extension
/// and the declared content type name an accepted image type.
pub fn image_extension(
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, UploadError> {
    let extension = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| IMAGE_TYPES.contains(&ext.as_str()))
        .ok_or(UploadError::UnsupportedType)?;

    let mime_ok = content_type
        .map(str::to_ascii_lowercase)
        .and_then(|mime| {
            mime.strip_prefix("image/")
                .map(|subtype| IMAGE_TYPES.contains(&subtype))
        })
        .unwrap_or(false);
    if !mime_ok {
        return Err(UploadError::UnsupportedType);
    }

    Ok(extension)
}

/// Write an image under a fresh unique name.
///
/// # Errors
///
/// Returns `UploadError::TooLarge` or `UploadError::Io`.
pub async fn store_product_image(
    upload_dir: &Path,
    extension: &str,
    bytes: &[u8],
) -> Result<StoredImage, UploadError> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }

    let dir = upload_dir.join(PRODUCT_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let filename = format!("product-{}.{extension}", Uuid::new_v4());
    tokio::fs::write(dir.join(&filename), bytes).await?;

    tracing::info!(filename, size = bytes.len(), "Stored product image");
    Ok(StoredImage {
        url: format!("/uploads/{PRODUCT_DIR}/{filename}"),
        filename,
    })
}
