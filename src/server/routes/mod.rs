mod categories;
mod questions;
mod quizzes;

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

/// Every failure a handler reports. The client only ever sees the status and a fixed
/// message; the cause is logged where the error is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    BadRequest,
    NotFound,
    Unprocessable,
    Internal,
}

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: &'static str,
}

impl ApiError {
    fn status(self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> &'static str {
        match self {
            ApiError::BadRequest => "bad request",
            ApiError::NotFound => "Resource Not Found",
            ApiError::Unprocessable => "unprocessable",
            ApiError::Internal => "internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Logs a store failure and turns it into the error kind the calling handler reports.
pub trait ResultExt<T> {
    fn or_not_found(self) -> ApiResponse<T>;
    fn or_unprocessable(self) -> ApiResponse<T>;
    fn or_internal(self) -> ApiResponse<T>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn or_not_found(self) -> ApiResponse<T> {
        self.map_err(|e| log_failure(e, ApiError::NotFound))
    }

    fn or_unprocessable(self) -> ApiResponse<T> {
        self.map_err(|e| log_failure(e, ApiError::Unprocessable))
    }

    fn or_internal(self) -> ApiResponse<T> {
        self.map_err(|e| log_failure(e, ApiError::Internal))
    }
}

fn log_failure(error: impl Display, kind: ApiError) -> ApiError {
    tracing::error!(status = kind.status().as_u16(), "Request failed: {error}");
    kind
}

/// Top-level keys a request body carried beyond the ones its endpoint reads.
pub(crate) type ExtraFields = Map<String, Value>;

fn reject_unknown_fields(extra: &ExtraFields) -> ApiResponse<()> {
    if extra.is_empty() {
        return Ok(());
    }
    let fields: Vec<&str> = extra.keys().map(String::as_str).collect();
    tracing::info!(?fields, "Unknown body fields");
    Err(ApiError::BadRequest)
}
