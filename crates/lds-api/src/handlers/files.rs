//! File upload, search, update and delete handlers.
//!
//! Uploads and updates take `multipart/form-data`. The `tags` field is a
//! single whitespace-separated string and is required on both; it is
//! normalized (split, trimmed, lowercased) before it reaches the store.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use lds_core::defaults::{SEARCH_PAGE_SIZE, UNNAMED_FILE};
use lds_core::{normalize_tags, FileListResponse, FileMeta, FileResponse, FileUpload};

use crate::{ApiError, AppState};

/// Query parameters for tag search.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchFilesQuery {
    /// Whitespace-separated tags; a file matches when it carries any of them.
    pub tags: Option<String>,
    /// Resume after this order key (the `orderNo` of the last file seen).
    #[serde(rename = "orderNo")]
    pub order_no: Option<String>,
    /// Page size (default 50).
    pub size: Option<i64>,
}

/// Upload one or more files under a shared tag list.
///
/// # Multipart Fields
/// - `files` (or `files[]`): file part, repeatable (at least one required)
/// - `tags`: whitespace-separated tags (required, may be blank)
///
/// # Returns
/// - 201 Created with the stored records in upload order
/// - 400 Bad Request if `tags` or every file part is missing
/// - 413 Payload Too Large if the body exceeds `MAX_UPLOAD_BYTES`
#[utoipa::path(post, path = "/api/files", tag = "Files",
    responses(
        (status = 201, description = "Files stored", body = FileListResponse),
        (status = 400, description = "Malformed form"),
        (status = 413, description = "Body too large"),
    ))]
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileListResponse>), ApiError> {
    let mut uploads = Vec::new();
    let mut tags: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("files") | Some("files[]") => {
                let name = field.file_name().unwrap_or(UNNAMED_FILE).to_string();
                let content_type = field.content_type().map(|c| c.to_string());
                let data = field.bytes().await?.to_vec();
                uploads.push(FileUpload::new(name, content_type, data));
            }
            Some("tags") => tags = Some(field.text().await?),
            _ => {} // ignore unknown fields
        }
    }

    let tags = tags.ok_or_else(|| ApiError::BadRequest("Missing tags in multipart form".into()))?;
    if uploads.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing files in multipart form".into(),
        ));
    }

    let files = state
        .files
        .upload_files(uploads, normalize_tags(Some(&tags)))
        .await?;

    Ok((StatusCode::CREATED, Json(FileListResponse { files })))
}

/// Search files by tag, newest write first.
///
/// With no tags every file matches. Pass the `orderNo` of the last file of
/// one page to get the next page.
#[utoipa::path(get, path = "/api/files", tag = "Files",
    params(SearchFilesQuery),
    responses((status = 200, description = "Matching files", body = FileListResponse)))]
pub async fn search_files(
    State(state): State<AppState>,
    Query(query): Query<SearchFilesQuery>,
) -> Result<Json<FileListResponse>, ApiError> {
    let files = state
        .files
        .search_files(
            normalize_tags(query.tags.as_deref()),
            query.order_no,
            query.size.unwrap_or(SEARCH_PAGE_SIZE),
        )
        .await?;

    Ok(Json(FileListResponse { files }))
}

/// Replace a file's tags, and its content when a `file` part is sent.
///
/// # Multipart Fields
/// - `file`: replacement content (optional)
/// - `tags`: whitespace-separated tags (required, replaces the old list)
#[utoipa::path(put, path = "/api/files/{id}", tag = "Files",
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "Updated file", body = FileResponse),
        (status = 400, description = "Malformed form"),
        (status = 404, description = "Unknown file"),
    ))]
pub async fn update_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<FileResponse>, ApiError> {
    let existing = find_file(&state, &id).await?;

    let mut upload: Option<FileUpload> = None;
    let mut tags: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or(UNNAMED_FILE).to_string();
                let content_type = field.content_type().map(|c| c.to_string());
                let data = field.bytes().await?.to_vec();
                upload = Some(FileUpload::new(name, content_type, data));
            }
            Some("tags") => tags = Some(field.text().await?),
            _ => {}
        }
    }

    let tags = tags.ok_or_else(|| ApiError::BadRequest("Missing tags in multipart form".into()))?;

    let file = state
        .files
        .update_file(&existing, upload, normalize_tags(Some(&tags)))
        .await?;

    Ok(Json(FileResponse { file }))
}

/// Delete a file, its content and its thumbnail.
#[utoipa::path(delete, path = "/api/files/{id}", tag = "Files",
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "Unknown file"),
    ))]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let existing = find_file(&state, &id).await?;
    state.files.delete_file(&existing).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every file and every stored blob.
#[utoipa::path(delete, path = "/api/reset", tag = "Files",
    responses((status = 204, description = "All files deleted")))]
pub async fn reset(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.files.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve a path id to its record. Ids that are not UUIDs cannot exist.
async fn find_file(state: &AppState, id: &str) -> Result<FileMeta, ApiError> {
    let file_id = Uuid::parse_str(id).map_err(|_| ApiError::NotFound)?;
    state
        .files
        .get_file(file_id)
        .await?
        .ok_or(ApiError::NotFound)
}
