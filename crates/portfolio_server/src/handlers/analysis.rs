//! Portfolio analysis handlers.
//!
//! AI failures never surface as HTTP errors here; the orchestrator degrades
//! them. Only storage failures produce a 5xx.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

const AI_SERVICE_NAME: &str = "AI analysis";
/// Probe answers are cut to this many characters in the health payload.
const HEALTH_RESPONSE_PREVIEW_CHARS: usize = 50;

pub async fn get_analysis(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let projects = state.store.with_service(|service| service.list_all())?;
    let result = state.analysis.get_project_analysis(&projects).await;
    Ok(Json(result))
}

pub async fn regenerate_analysis(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let projects = state.store.with_service(|service| service.list_all())?;
    let result = state.analysis.regenerate_analysis(&projects).await;
    Ok(Json(result))
}

pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.analysis.clear_cache();
    Json(json!({
        "success": true,
        "message": "Analysis cache cleared",
        "timestamp": Utc::now(),
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.analysis.health_check().await {
        Ok(response) => {
            let mut preview: String = response.chars().take(HEALTH_RESPONSE_PREVIEW_CHARS).collect();
            if response.chars().count() > HEALTH_RESPONSE_PREVIEW_CHARS {
                preview.push_str("...");
            }
            (
                StatusCode::OK,
                Json(json!({
                    "status": "healthy",
                    "service": AI_SERVICE_NAME,
                    "response": preview,
                    "timestamp": Utc::now(),
                })),
            )
        }
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": AI_SERVICE_NAME,
                "error": err.to_string(),
                "timestamp": Utc::now(),
            })),
        ),
    }
}
