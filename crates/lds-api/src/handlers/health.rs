//! Liveness check.

use axum::http::StatusCode;

/// Always answers 204 while the process is serving requests.
#[utoipa::path(get, path = "/api/healthchecker", tag = "System",
    responses((status = 204, description = "Service is up")))]
pub async fn health_check() -> StatusCode {
    StatusCode::NO_CONTENT
}
