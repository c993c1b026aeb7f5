//! HTTP boundary for the project portfolio service.
//!
//! # Responsibility
//! - Parse and sanitize requests, call `portfolio_core`, and shape JSON
//!   responses.
//! - Load process configuration from the environment.

pub mod config;
pub mod error;
pub mod handlers;
pub mod payload;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, FieldError};
pub use routes::build_router;
pub use state::{AppState, ProjectStore};
