//! Router assembly and request-level middleware.
//!
//! # Responsibility
//! - Map every endpoint to its handler.
//! - Apply CORS, the body size limit and access logging.
//!
//! # Invariants
//! - Every response carries an `x-request-id` header.
//! - Unknown routes answer 404 with the endpoint list.

use crate::handlers::{analysis, charts, projects, system};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, Request};
use axum::middleware::{from_fn, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use log::info;
use std::time::Instant;
use tower_http::cors::{AllowHeaders, CorsLayer};
use uuid::Uuid;

/// Maximum accepted request body size.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_CHARS: usize = 128;

pub fn build_router(state: AppState, frontend_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(frontend_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/api/charts", get(charts::get_charts))
        .route("/api/analysis", get(analysis::get_analysis))
        .route("/api/analysis/regenerate", post(analysis::regenerate_analysis))
        .route("/api/analysis/cache", delete(analysis::clear_cache))
        .route("/api/analysis/health", get(analysis::health))
        .fallback(system::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(from_fn(log_requests))
}

/// Logs one access line per request and echoes or assigns a request id.
async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let started_at = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_REQUEST_ID_CHARS)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = next.run(req).await;

    info!(
        "event=http_request module=http status={} method={} path={} request_id={} duration_ms={}",
        response.status().as_u16(),
        method,
        path,
        request_id,
        started_at.elapsed().as_millis()
    );
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
