use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use portfolio_core::ChartSummary;
use serde_json::json;

pub async fn get_charts(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let projects = state.store.with_service(|service| service.list_all())?;
    let summary = ChartSummary::from_projects(&projects, Utc::now());
    Ok(Json(json!({
        "success": true,
        "data": summary,
    })))
}
