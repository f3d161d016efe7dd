//! Raw content download.
//!
//! Serves file content and thumbnails by the storage keys found in
//! `path` and `thumbnailPath` of a file record.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::{ApiError, AppState};

/// Return stored bytes with the content type recorded at upload.
#[utoipa::path(get, path = "/api/blobs/{path}", tag = "Files",
    params(("path" = String, Path, description = "Storage key, e.g. files/{id}")),
    responses(
        (status = 200, description = "Stored bytes"),
        (status = 400, description = "Malformed storage key"),
        (status = 404, description = "No such blob"),
    ))]
pub async fn get_blob(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = state
        .files
        .read_blob(&path)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(([(header::CONTENT_TYPE, stored.content_type)], stored.data))
}
