//! HTTP error envelope.
//!
//! Every failure leaves the server as
//! `{ "success": false, "error": ..., "message": ..., "details"?: [...] }`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use portfolio_core::{ProjectValidationError, RepoError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ProjectValidationError> for FieldError {
    fn from(value: &ProjectValidationError) -> Self {
        Self {
            field: value.field().to_string(),
            message: value.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),
    NotFound(String),
    BadRequest(String),
    UnsupportedMediaType(String),
    PayloadTooLarge(String),
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation failed",
            Self::NotFound(_) => "Not found",
            Self::BadRequest(_) => "Bad request",
            Self::UnsupportedMediaType(_) => "Unsupported media type",
            Self::PayloadTooLarge(_) => "Payload too large",
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(details) => {
                write!(f, "{} field(s) failed validation", details.len())
            }
            Self::NotFound(message)
            | Self::BadRequest(message)
            | Self::UnsupportedMediaType(message)
            | Self::PayloadTooLarge(message)
            | Self::Internal(message) => f.write_str(message),
        }
    }
}

impl Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let details = match &self {
            Self::Validation(details) => Some(details.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            error: self.title(),
            message: &message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProjectValidationError> for ApiError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(vec![FieldError::from(&value)])
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => err.into(),
            RepoError::NotFound(id) => Self::NotFound(format!("no project found with id {id}")),
            RepoError::Db(_) | RepoError::InvalidData(_) => {
                // Storage details stay in the log; clients get a generic message.
                error!("event=http_storage_error module=http status=error error={value}");
                Self::Internal("storage operation failed".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        let message = value.body_text();
        match value.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => Self::UnsupportedMediaType(message),
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge(message),
            _ => Self::BadRequest(message),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}
