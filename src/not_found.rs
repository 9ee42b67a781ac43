//! The response for resources and routes that do not exist.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The fallback handler for routes that do not exist.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// A 404 response with the body `{"detail": "Not found."}`.
pub fn get_404_not_found_response() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}
