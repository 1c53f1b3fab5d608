use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use super::routes::ApiError;

// axum's own extractors answer with plain-text bodies; these wrappers route every
// rejection through ApiError so clients always get the JSON error shape.

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Parseable JSON of the wrong shape is unprocessable, anything that is not JSON at all
/// is a bad request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::info!("Rejected request body: {}", rejection.body_text());
        match rejection {
            JsonRejection::JsonDataError(_) => ApiError::Unprocessable,
            _ => ApiError::BadRequest,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::info!("Rejected query string: {}", rejection.body_text());
        ApiError::BadRequest
    }
}

/// A path segment that is not a valid id cannot name an existing resource.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::info!("Rejected path: {}", rejection.body_text());
        ApiError::NotFound
    }
}
