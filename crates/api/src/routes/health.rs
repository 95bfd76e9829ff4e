//! Health check endpoints.

use axum::Json;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: the service is always serving once it accepts connections.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "SERVING" })
}

/// GET /health/watch: streaming health is not offered.
pub async fn watch() -> ApiError {
    ApiError::Unimplemented("health check via Watch not implemented".to_string())
}
