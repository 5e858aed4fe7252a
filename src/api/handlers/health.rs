use axum::response::{IntoResponse, Json};
use serde_json::json;
use tracing::instrument;

#[utoipa::path(
    get,
    path= "/",
    responses (
        (status = 200, description = "Service banner"),
    ),
    tag = "health",
)]
// axum handler for the health check
#[instrument]
pub async fn health() -> impl IntoResponse {
    Json(json!({ "message": "Secure Flask App Running" }))
}
