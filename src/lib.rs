//! # Ensaluto (Authentication Edge)
//!
//! `ensaluto` is a minimal HTTP service that sits at the edge of a deployment
//! and hands out signed, short-lived tokens. It exposes two routes: an
//! unauthenticated health check and a login endpoint that issues an HS256
//! token when the fixed demo credentials match.
//!
//! Every matched request passes a per-client fixed-window rate limiter
//! (default 10 requests/minute, login capped at 5/minute), every outgoing
//! response carries a fixed hardening header set, and framework-level
//! failures (malformed or oversized bodies, unmatched routes, exceeded
//! quotas) are normalized to uniform JSON error bodies.
//!
//! Tokens are signed with the active secret from an immutable, process-wide
//! configuration. Fallback secrets are carried for consumer-side key
//! rotation; no route in this service verifies a presented token.

pub mod api;
pub mod cli;
pub mod token;
