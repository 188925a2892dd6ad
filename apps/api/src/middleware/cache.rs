//! Response cache for the JSON API.
//!
//! Cache-aside: a hit replays the stored response, a miss runs the handler
//! and keeps the result only when it succeeded and did not ask for
//! `Cache-Control: no-store`. Entries expire by TTL.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::errors::{AppError, FieldError};

const MAX_ENTRIES: u64 = 10_000;
/// Largest request or response body the cache will buffer.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
struct CachedResponse {
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: Bytes,
}

impl CachedResponse {
    fn replay(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

#[derive(Clone)]
pub struct ResponseCache {
    entries: Cache<String, CachedResponse>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
        }
    }
}

/// `METHOD path?query`, plus `#<sha256 of body>` for anything but GET.
pub fn cache_key(method: &Method, uri: &Uri, body: &[u8]) -> String {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

    if method == Method::GET {
        format!("{method} {target}")
    } else {
        format!("{method} {target}#{}", hex::encode(Sha256::digest(body)))
    }
}

fn is_no_store(response: &Response) -> bool {
    response
        .headers()
        .get_all(header::CACHE_CONTROL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|directive| directive.trim().eq_ignore_ascii_case("no-store"))
}

pub async fn cache_responses(
    State(cache): State<ResponseCache>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|_| {
        AppError::Validation(vec![FieldError::new(
            "body",
            "Request body is too large or unreadable",
        )])
    })?;

    let key = cache_key(&parts.method, &parts.uri, &body);
    if let Some(hit) = cache.entries.get(&key).await {
        debug!(key = %key, "Cache hit");
        return Ok(hit.replay());
    }

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;
    if !response.status().is_success() || is_no_store(&response) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| anyhow::anyhow!("failed to buffer response for caching: {e}"))?;

    cache
        .entries
        .insert(
            key,
            CachedResponse {
                status: parts.status,
                content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
                body: body.clone(),
            },
        )
        .await;

    Ok(Response::from_parts(parts, Body::from(body)))
}
