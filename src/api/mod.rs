use crate::{
    api::rate_limit::{FixedWindowLimiter, Quota, RateLimitState},
    cli::globals::GlobalArgs,
    token::TokenSigner,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod security_headers;

pub const LOGIN_PATH: &str = "/auth/login";

// The login route overrides the configurable default quota.
const LOGIN_RATE_LIMIT_PER_MINUTE: u32 = 5;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health::health, handlers::login::login),
    components(
        schemas(handlers::login::Login, handlers::login::Token, error::ErrorBody)
    ),
    tags(
        (name = "ensaluto", description = "Authentication edge API"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router.
///
/// Kept separate from [`new`] so tests can drive the full middleware stack
/// in-process.
///
/// # Errors
/// Returns an error if no signing secret is configured.
pub fn app(globals: &GlobalArgs) -> Result<Router> {
    let signer = Arc::new(TokenSigner::new(&globals.secret_key).context("Cannot build token signer")?);

    let limits = RateLimitState {
        limiter: Arc::new(FixedWindowLimiter::default()),
        default_quota: Quota::per_minute(globals.default_rate_limit),
        login_quota: Quota::per_minute(LOGIN_RATE_LIMIT_PER_MINUTE),
    };

    let cors = CorsLayer::new()
        // allow `GET` and `POST` when accessing the resource
        .allow_methods([Method::GET, Method::POST])
        // allow requests from any origin
        .allow_origin(Any);

    let app = Router::new()
        .route("/", get(handlers::health))
        .route(LOGIN_PATH, post(handlers::login))
        // quotas only apply to matched routes, the fallback is not counted
        .route_layer(middleware::from_fn_with_state(limits, rate_limit::enforce))
        .fallback(error::fallback)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &Request<Body>| {
                        HeaderValue::from_str(Ulid::new().to_string().as_str()).ok()
                    },
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(middleware::from_fn(security_headers::security_headers))
                .layer(cors)
                .layer(middleware::from_fn(error::normalize))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(globals.max_body_bytes))
                .layer(Extension(signer)),
        );

    Ok(app)
}

/// Start the HTTP listener.
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(port: u16, globals: &GlobalArgs) -> Result<()> {
    let app = app(globals)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Gracefully shutdown");
    })
    .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}
