//! Uniform JSON error bodies.
//!
//! Three failure conditions are normalized: malformed or oversized requests
//! (400), unmatched routes (404), and exceeded quotas (429). Authentication
//! failure is a normal 401 produced by the login handler, and anything else
//! (signing failures included) passes through untouched.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[must_use]
pub fn bad_request() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new("Bad Request")))
}

#[must_use]
pub fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not Found")))
}

#[must_use]
pub fn too_many_requests() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorBody::new("Too Many Requests")),
    )
}

/// Router fallback for unmatched paths.
pub async fn fallback() -> impl IntoResponse {
    not_found()
}

/// Rewrite framework-produced failures to the canonical bodies.
///
/// The body-limit layer replies 413 for oversized requests; that condition
/// is reported as 400 alongside malformed bodies.
pub async fn normalize(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    match response.status() {
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => bad_request().into_response(),
        StatusCode::NOT_FOUND => not_found().into_response(),
        StatusCode::TOO_MANY_REQUESTS => too_many_requests().into_response(),
        _ => response,
    }
}
