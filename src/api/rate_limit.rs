//! Per-client request quotas.
//!
//! Counters are fixed-window: the first request for a key opens the window,
//! the count resets when the window elapses. Nothing is persisted across
//! restarts. Handlers never see a limited request; the middleware replies
//! 429 before routing reaches them.

use crate::api::error;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

/// Requests admitted per window for one client on one route.
#[derive(Clone, Copy, Debug)]
pub struct Quota {
    pub max_requests: u32,
    pub window: Duration,
}

impl Quota {
    #[must_use]
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

pub trait RateLimiter: Send + Sync {
    fn check_and_consume(&self, key: &str, quota: Quota) -> RateLimitDecision;
}

/// Limiter that admits everything, for handler tests.
#[derive(Clone, Debug, Default)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_and_consume(&self, _key: &str, _quota: Quota) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

struct Window {
    started: Instant,
    count: u32,
}

/// In-memory fixed-window counters keyed by client + route.
#[derive(Default)]
pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter for FixedWindowLimiter {
    fn check_and_consume(&self, key: &str, quota: Quota) -> RateLimitDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= quota.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < quota.max_requests {
            window.count += 1;
            RateLimitDecision::Allowed
        } else {
            RateLimitDecision::Limited
        }
    }
}

/// Quotas and limiter shared by the enforcement middleware.
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<dyn RateLimiter>,
    pub default_quota: Quota,
    pub login_quota: Quota,
}

/// Enforce the route quota, short-circuiting to 429 on rejection.
///
/// Registered as a `route_layer`, so unmatched paths are never counted.
pub async fn enforce(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let route = request.uri().path().to_string();
    let quota = if route == crate::api::LOGIN_PATH {
        state.login_quota
    } else {
        state.default_quota
    };

    let client = client_key(&request);

    match state
        .limiter
        .check_and_consume(&format!("{route}:{client}"), quota)
    {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited => {
            warn!(client = %client, route = %route, "Rate limit exceeded");
            error::too_many_requests().into_response()
        }
    }
}

// Proxies put the original client first in x-forwarded-for.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(client) = forwarded
            .split(',')
            .next()
            .map(str::trim)
            .filter(|client| !client.is_empty())
        {
            return client.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(
            || "unknown".to_string(),
            |ConnectInfo(addr)| addr.ip().to_string(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    #[test]
    fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(
            limiter.check_and_consume("a", Quota::per_minute(0)),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn fixed_window_admits_up_to_quota() {
        let limiter = FixedWindowLimiter::default();
        let quota = Quota::per_minute(5);

        for _ in 0..5 {
            assert_eq!(
                limiter.check_and_consume("login:10.0.0.1", quota),
                RateLimitDecision::Allowed
            );
        }

        assert_eq!(
            limiter.check_and_consume("login:10.0.0.1", quota),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn fixed_window_resets_after_window_elapses() {
        let limiter = FixedWindowLimiter::default();
        let quota = Quota {
            max_requests: 2,
            window: Duration::from_millis(40),
        };

        assert_eq!(
            limiter.check_and_consume("k", quota),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_and_consume("k", quota),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_and_consume("k", quota),
            RateLimitDecision::Limited
        );

        std::thread::sleep(Duration::from_millis(60));

        assert_eq!(
            limiter.check_and_consume("k", quota),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter = FixedWindowLimiter::default();
        let quota = Quota::per_minute(1);

        assert_eq!(
            limiter.check_and_consume("login:10.0.0.1", quota),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_and_consume("login:10.0.0.1", quota),
            RateLimitDecision::Limited
        );
        assert_eq!(
            limiter.check_and_consume("login:10.0.0.2", quota),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_and_consume("health:10.0.0.1", quota),
            RateLimitDecision::Allowed
        );
    }

    fn request() -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri("/auth/login")
            .body(Body::empty())
            .expect("request")
    }

    #[test]
    fn client_key_prefers_forwarded_header() {
        let mut request = request();
        request
            .headers_mut()
            .insert("x-forwarded-for", "203.0.113.10, 10.0.0.1".parse().expect("header"));

        assert_eq!(client_key(&request), "203.0.113.10");
    }

    #[test]
    fn client_key_falls_back_to_peer_address() {
        let mut request = request();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 5], 4242))));

        assert_eq!(client_key(&request), "198.51.100.5");
    }

    #[test]
    fn client_key_without_peer_is_unknown() {
        assert_eq!(client_key(&request()), "unknown");
    }
}
