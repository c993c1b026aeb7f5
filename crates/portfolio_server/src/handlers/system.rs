//! Service metadata, liveness and the unknown-route fallback.

use crate::state::AppState;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use log::warn;
use serde_json::json;

pub const AVAILABLE_ENDPOINTS: [&str; 12] = [
    "GET /",
    "GET /health",
    "GET /api/projects",
    "GET /api/projects/{id}",
    "POST /api/projects",
    "PUT /api/projects/{id}",
    "DELETE /api/projects/{id}",
    "GET /api/charts",
    "GET /api/analysis",
    "POST /api/analysis/regenerate",
    "DELETE /api/analysis/cache",
    "GET /api/analysis/health",
];

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Project portfolio API",
        "version": env!("CARGO_PKG_VERSION"),
        "coreVersion": portfolio_core::core_version(),
        "endpoints": {
            "health": "/health",
            "projects": "/api/projects",
            "analysis": "/api/analysis",
            "charts": "/api/charts",
        },
    }))
}

/// Always 200; `status` reports whether storage answered.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.with_service(|service| service.count_projects()) {
        Ok(project_count) => Json(json!({
            "status": "OK",
            "message": "Server and database are running",
            "database": "connected",
            "projectCount": project_count,
            "timestamp": Utc::now(),
        })),
        Err(err) => {
            warn!("event=health_check module=http status=degraded error={err}");
            Json(json!({
                "status": "WARNING",
                "message": "Server is running but the database is unavailable",
                "database": "unavailable",
                "timestamp": Utc::now(),
            }))
        }
    }
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Route not found",
            "message": format!("route {} does not exist", uri.path()),
            "availableEndpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}
