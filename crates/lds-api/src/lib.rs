//! # lds-api
//!
//! HTTP surface of the LDS file service: multipart upload, tag search,
//! update, delete and reset over a metadata store and an object store.
//!
//! The binary (`src/main.rs`) wires configuration, logging and concrete
//! stores; this library exposes [`router`] so tests can serve the same
//! routes over in-memory stores.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

pub use config::{AppConfig, FileServiceConfig, MetadataBackendKind, StorageBackendKind};
pub use error::ApiError;
pub use services::FileService;

use handlers::{blobs, files, health};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub files: FileService,
}

impl AppState {
    pub fn new(files: FileService) -> Self {
        Self { files }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// OpenAPI document served under `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "LDS File Service API",
        description = "Upload files, tag them, and search by tag"
    ),
    paths(
        health::health_check,
        files::upload_files,
        files::search_files,
        files::update_file,
        files::delete_file,
        files::reset,
        blobs::get_blob,
    ),
    components(schemas(
        lds_core::FileRecord,
        lds_core::FileListResponse,
        lds_core::FileResponse,
    )),
    tags(
        (name = "Files", description = "File upload, search and lifecycle"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

/// Build the full application router.
///
/// Bodies larger than `max_upload_bytes` are rejected with 413, both by the
/// declared `Content-Length` and while streaming multipart fields.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/api/healthchecker", get(health::health_check))
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Files
        .route(
            "/api/files",
            get(files::search_files).post(files::upload_files),
        )
        .route(
            "/api/files/:id",
            put(files::update_file).delete(files::delete_file),
        )
        .route("/api/reset", delete(files::reset))
        .route("/api/blobs/*path", get(blobs::get_blob))
        // Middleware
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lds_db::{MemoryMetadataStore, MemoryObjectStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let service = FileService::new(
            Arc::new(MemoryMetadataStore::new()),
            Arc::new(MemoryObjectStore::new()),
            FileServiceConfig::default(),
        );
        router(AppState::new(service), 1024)
    }

    #[tokio::test]
    async fn test_health_check_is_no_content() {
        let response = test_router()
            .oneshot(
                Request::get("/api/healthchecker")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let response = test_router()
            .oneshot(
                Request::get("/api/healthchecker")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_non_uuid_id_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::delete("/api/files/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_content_length_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::post("/api/files")
                    .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
                    .header(header::CONTENT_LENGTH, "4096")
                    .body(Body::from(vec![b'a'; 4096]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_openapi_lists_file_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/files"));
        assert!(doc.paths.paths.contains_key("/api/files/{id}"));
        assert!(doc.paths.paths.contains_key("/api/healthchecker"));
    }
}
