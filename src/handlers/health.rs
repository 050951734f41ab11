//! Health check endpoint for service monitoring.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,
}

/// Health check handler. Public; not behind the access gate.
///
/// # Response (200 OK)
///
/// ```json
/// { "status": "healthy" }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
