mod middleware;
mod public;

pub use public::{HttpState, build_router};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::application::error::AppError;

/// Render an application error as the JSON error envelope used by the
/// write endpoints.
pub fn api_error(err: AppError) -> Response {
    let body = json!({
        "status": "error",
        "message": err.public_message(),
    });
    (err.status_code(), Json(body)).into_response()
}

/// A 400 envelope for requests whose body never reached the application.
pub fn api_bad_request(message: impl Into<String>) -> Response {
    let body = json!({
        "status": "error",
        "message": message.into(),
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
