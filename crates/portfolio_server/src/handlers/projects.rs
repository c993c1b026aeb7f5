//! Project CRUD handlers.

use crate::error::ApiResult;
use crate::payload::{parse_project_id, CreateProjectBody, ListProjectsParams, UpdateProjectBody};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn list_projects(
    State(state): State<AppState>,
    params: Result<Query<ListProjectsParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(params) = params?;
    let query = params.into_query()?;
    let projects = state.store.with_service(|service| service.list_projects(&query))?;
    Ok(Json(json!({
        "success": true,
        "data": projects,
    })))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_project_id(&raw_id)?;
    let project = state.store.with_service(|service| service.get_project(id))?;
    Ok(Json(json!({
        "success": true,
        "data": project,
    })))
}

pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<CreateProjectBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let input = body.into_new_project()?;
    let project = state
        .store
        .with_service(|service| service.create_project(&input))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Project created successfully",
            "data": project,
        })),
    ))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateProjectBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_project_id(&raw_id)?;
    let Json(body) = payload?;
    let patch = body.into_patch()?;
    let project = state
        .store
        .with_service(|service| service.update_project(id, &patch))?;
    Ok(Json(json!({
        "success": true,
        "message": "Project updated successfully",
        "data": project,
    })))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_project_id(&raw_id)?;
    state.store.with_service(|service| service.delete_project(id))?;
    Ok(Json(json!({
        "success": true,
        "message": "Project deleted successfully",
    })))
}
