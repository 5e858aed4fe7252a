use crate::{
    api::error::{self, ErrorBody},
    token::{TokenSigner, DEFAULT_TTL_MINUTES},
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

// Fixture credentials, not a credential store.
const DEMO_USERNAME: &str = "admin";
const DEMO_PASSWORD: &str = "admin123";

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct Login {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Token {
    token: String,
}

#[utoipa::path(
    post,
    path= "/auth/login",
    request_body = Login,
    responses (
        (status = 200, description = "Login successful", body = Token),
        (status = 400, description = "Malformed payload", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
    ),
    tag = "auth",
)]
// axum handler for login
#[instrument(skip(signer, payload))]
pub async fn login(
    Extension(signer): Extension<Arc<TokenSigner>>,
    payload: Result<Json<Login>, JsonRejection>,
) -> Response {
    let Json(credentials) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            debug!("Failed to parse login payload: {}", rejection);
            return error::bad_request().into_response();
        }
    };

    // Absent fields count as empty, they only fail the comparison.
    let username = credentials.username.unwrap_or_default();
    let password = credentials.password.unwrap_or_default();

    if username != DEMO_USERNAME || password != DEMO_PASSWORD {
        debug!("Invalid credentials for user: {:?}", username);

        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Invalid credentials")),
        )
            .into_response();
    }

    let mut claims = Map::new();
    claims.insert("user".to_string(), Value::from(username));

    match signer.issue(claims, DEFAULT_TTL_MINUTES) {
        Ok(token) => (StatusCode::OK, Json(Token { token })).into_response(),
        Err(err) => {
            error!("Failed to sign token: {}", err);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to sign token".to_string(),
            )
                .into_response()
        }
    }
}
