//! Image Upload Handler
//!
//! Supports PNG, JPEG and WebP uploads, re-encoded to JPEG. The stored file
//! name is the SHA-256 of the re-encoded bytes, so uploading the same picture
//! twice yields the same URL.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Multipart, Path as UrlPath, State};
use axum::response::IntoResponse;
use http::header;
use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::error::ErrorCode;

use crate::utils::types::DeleteResponse;
use crate::{AppError, AppResult, CurrentUser, ServerState};

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality for garment photos
const JPEG_QUALITY: u8 = 85;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub format: String,
    pub url: String,
    /// `true` when an identical image was already stored
    pub deduplicated: bool,
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Validate size and extension before decoding
fn validate_upload(data: &[u8], ext: &str) -> AppResult<()> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!(
                "File too large. Maximum size is {}MB",
                MAX_FILE_SIZE / 1024 / 1024
            ),
        )
        .with_detail("max_bytes", MAX_FILE_SIZE as u64));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!(
                "Unsupported file format '{}'. Supported: {}",
                ext_lower,
                SUPPORTED_FORMATS.join(", ")
            ),
        ));
    }
    Ok(())
}

/// Decode and re-encode as JPEG
fn reencode_jpeg(data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
    })?;

    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    img.to_rgb8().write_with_encoder(encoder).map_err(|e| {
        AppError::with_message(
            ErrorCode::ImageProcessingFailed,
            format!("Failed to compress image: {e}"),
        )
    })?;
    Ok(buffer)
}

/// Validate, re-encode and store one image under `images_dir`
///
/// Blocking (image decoding + file IO); call from `spawn_blocking`.
pub fn store_image(images_dir: &Path, data: &[u8], original_name: &str) -> AppResult<UploadResponse> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("Invalid file extension for: {original_name}"),
            )
        })?;
    validate_upload(data, ext)?;

    let compressed = reencode_jpeg(data)?;
    let filename = format!("{}.jpg", calculate_hash(&compressed));
    let file_path = images_dir.join(&filename);

    let deduplicated = file_path.exists();
    if !deduplicated {
        std::fs::create_dir_all(images_dir)
            .and_then(|_| std::fs::write(&file_path, &compressed))
            .map_err(|e| {
                AppError::with_message(
                    ErrorCode::FileStorageFailed,
                    format!("Failed to save file: {e}"),
                )
            })?;
    }

    Ok(UploadResponse {
        url: format!("/api/image/{filename}"),
        filename,
        original_name: original_name.to_string(),
        size: compressed.len(),
        format: "jpg".to_string(),
        deduplicated,
    })
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::invalid_request(format!("Invalid multipart request: {e}"))
}

/// Upload image handler
pub async fn upload(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    // Find the file field
    let mut file: Option<(String, Bytes)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| AppError::validation("No filename provided in file field"))?;
            let bytes = field.bytes().await.map_err(multipart_error)?;
            file = Some((name, bytes));
            break;
        }
    }

    let (original_name, data) = file.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::NoFileProvided,
            "No 'file' field found. Field name must be 'file'",
        )
    })?;

    let images_dir = state.images_dir();
    let response = tokio::task::spawn_blocking(move || store_image(&images_dir, &data, &original_name))
        .await
        .map_err(|e| AppError::internal(format!("Image task failed: {e}")))??;

    tracing::info!(
        original_name = %response.original_name,
        filename = %response.filename,
        size = response.size,
        deduplicated = response.deduplicated,
        uploaded_by = current_user.id,
        "Image uploaded"
    );
    Ok(Json(response))
}

/// Stored file path, rejecting anything that could escape the images dir
fn image_path(images_dir: &Path, filename: &str) -> AppResult<PathBuf> {
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return Err(AppError::validation("Invalid filename"));
    }
    Ok(images_dir.join(filename))
}

/// Serve uploaded file handler
pub async fn serve(
    State(state): State<ServerState>,
    UrlPath(filename): UrlPath<String>,
) -> AppResult<impl IntoResponse> {
    let path = image_path(&state.images_dir(), &filename)?;
    let content = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found(format!("Image {filename}")))?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            // content-addressed: a file name never changes content
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        content,
    ))
}

/// Delete an uploaded image
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    UrlPath(filename): UrlPath<String>,
) -> AppResult<Json<DeleteResponse>> {
    let path = image_path(&state.images_dir(), &filename)?;
    let deleted = match tokio::fs::remove_file(&path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            return Err(AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to delete file: {e}"),
            ));
        }
    };
    if deleted {
        tracing::info!(filename = %filename, deleted_by = current_user.id, "Image deleted");
    }
    Ok(Json(DeleteResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 90]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn same_picture_is_stored_once() {
        let dir = tempfile::tempdir().unwrap();
        let first = store_image(dir.path(), &png_bytes(), "gown.png").unwrap();
        let second = store_image(dir.path(), &png_bytes(), "gown-copy.PNG").unwrap();

        assert!(!first.deduplicated);
        assert!(second.deduplicated);
        assert_eq!(first.filename, second.filename);
        assert!(first.filename.ends_with(".jpg"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn rejects_bad_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_image(dir.path(), &png_bytes(), "gown.gif").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);

        let err = store_image(dir.path(), b"", "gown.png").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyFile);

        let err = store_image(dir.path(), b"not an image", "gown.jpg").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImageFile);

        let err = store_image(dir.path(), &png_bytes(), "noext").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
    }

    #[test]
    fn traversal_is_rejected() {
        let dir = Path::new("/srv/images");
        assert!(image_path(dir, "../secret").is_err());
        assert!(image_path(dir, "a/b.jpg").is_err());
        assert!(image_path(dir, "").is_err());
        assert_eq!(image_path(dir, "ab.jpg").unwrap(), dir.join("ab.jpg"));
    }
}
