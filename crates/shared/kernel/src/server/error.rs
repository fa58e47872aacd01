use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taxi_derive::api_model;

/// JSON body of every error response.
#[api_model]
pub struct ErrorBody {
    /// Error variant, e.g. `NotFound`.
    pub kind: String,
    pub message: String,
}

/// Builds `status` with an [`ErrorBody`].
pub fn error_response(status: StatusCode, kind: &str, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { kind: kind.to_owned(), message: message.into() })).into_response()
}
