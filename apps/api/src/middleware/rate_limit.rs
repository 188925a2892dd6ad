//! Fixed-window rate limiting per client address.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde_json::json;
use tokio::time::Instant;
use tracing::warn;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

const RATE_LIMIT_LIMIT: &str = "ratelimit-limit";
const RATE_LIMIT_REMAINING: &str = "ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "ratelimit-reset";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Result of counting one request against its client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window closes.
    pub reset_after: Duration,
}

#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    /// Counts a request for `client` and reports whether it may proceed.
    pub fn check(&self, client: &str) -> RateDecision {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(client.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        entry.count = entry.count.saturating_add(1);

        RateDecision {
            allowed: entry.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_after: self.window.saturating_sub(now.duration_since(entry.started)),
        }
    }

    /// Drops windows that have already closed.
    pub fn prune_expired(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// First `X-Forwarded-For` hop, else the socket peer, else `"unknown"`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn limit_rate(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(req.headers(), peer);
    let decision = limiter.check(&client);

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        warn!(client = %client, path = %req.uri().path(), "Rate limit exceeded");
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "status": 429, "error": RATE_LIMIT_MESSAGE })),
        )
            .into_response()
    };

    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(
        RATE_LIMIT_RESET,
        HeaderValue::from(decision.reset_after.as_secs_f64().ceil() as u64),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test(start_paused = true)]
    async fn test_window_counts_and_resets() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.check("a").allowed);
        let second = limiter.check("a");
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.check("a");
        assert!(!third.allowed);
        assert_eq!(third.reset_after, Duration::from_secs(60));

        // other clients have their own window
        assert!(limiter.check("b").allowed);

        tokio::time::advance(Duration::from_secs(61)).await;
        let fresh = limiter.check("a");
        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_drops_closed_windows() {
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        limiter.check("a");
        tokio::time::advance(Duration::from_secs(11)).await;
        limiter.check("b");

        limiter.prune_expired();
        assert_eq!(limiter.windows.len(), 1);
        assert!(limiter.windows.contains_key("b"));
    }

    #[test]
    fn test_client_key_preference() {
        let peer: SocketAddr = "10.0.0.7:5123".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, None), "unknown");
        assert_eq!(client_key(&headers, Some(peer)), "10.0.0.7");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.9");
    }

    #[tokio::test(start_paused = true)]
    async fn test_over_limit_gets_429_with_headers() {
        let limiter = RateLimiter::new(1, Duration::from_secs(900));
        let router = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(limiter, limit_rate));

        let request = || {
            axum::http::Request::get("/ping")
                .header("x-forwarded-for", "198.51.100.4")
                .body(Body::empty())
                .unwrap()
        };

        let ok = router.clone().oneshot(request()).await.unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers()["ratelimit-limit"], "1");
        assert_eq!(ok.headers()["ratelimit-remaining"], "0");
        assert_eq!(ok.headers()["ratelimit-reset"], "900");

        let limited = router.oneshot(request()).await.unwrap();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        let bytes = axum::body::to_bytes(limited.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 429);
        assert_eq!(body["error"], RATE_LIMIT_MESSAGE);
    }
}
