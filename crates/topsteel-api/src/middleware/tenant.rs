// ============================================================================
// TopSteel API - Tenant Injection Interceptor
// File: crates/topsteel-api/src/middleware/tenant.rs
// ============================================================================
//! Fills `societeId` / `siteId` into JSON bodies of write requests.
//!
//! Only missing fields are filled; ids already in the body are left alone.
//! Requests without a tenant context, non-JSON bodies, bodies larger than
//! `MAX_BODY_BYTES` and bodies that do not parse as an object pass through
//! untouched. This layer never rejects a request. Responses are not filtered.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{header::CONTENT_LENGTH, header::CONTENT_TYPE, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use futures::{stream, StreamExt};
use tracing::{debug, warn};

use topsteel_core::domain::{inject_tenant_ids, Principal};
use topsteel_shared::constants::MAX_BODY_BYTES;

/// Outcome of reading a request body up to the buffer limit
enum Buffered {
    Complete(Bytes),
    /// Over the limit or failed mid-read; re-assembled as it was received
    Passthrough(Body),
}

fn fits_buffer(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .map(|len| len <= MAX_BODY_BYTES)
        .unwrap_or(true)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

async fn buffer_body(body: Body, limit: usize) -> Buffered {
    let mut data = body.into_data_stream();
    let mut chunks: Vec<Bytes> = Vec::new();
    let mut size = 0;

    while let Some(next) = data.next().await {
        match next {
            Ok(chunk) => {
                size += chunk.len();
                chunks.push(chunk);
                if size > limit {
                    debug!(size, "Request body over buffer limit, skipping tenant injection");
                    let head = stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>));
                    return Buffered::Passthrough(Body::from_stream(head.chain(data)));
                }
            }
            Err(e) => {
                warn!("Request body failed mid-read: {}", e);
                let replay = chunks.into_iter().map(Ok).chain(std::iter::once(Err(e)));
                return Buffered::Passthrough(Body::from_stream(stream::iter(replay)));
            }
        }
    }

    Buffered::Complete(Bytes::from(chunks.concat()))
}

pub async fn inject_tenant(request: Request, next: Next) -> Response {
    let writes = matches!(*request.method(), Method::POST | Method::PUT | Method::PATCH);
    let tenant = request.extensions().get::<Principal>().and_then(|p| p.tenant);

    let Some(ctx) = tenant.filter(|_| writes && is_json(request.headers()) && fits_buffer(request.headers())) else {
        return next.run(request).await;
    };

    let (mut parts, body) = request.into_parts();
    let bytes = match buffer_body(body, MAX_BODY_BYTES).await {
        Buffered::Complete(bytes) => bytes,
        Buffered::Passthrough(body) => return next.run(Request::from_parts(parts, body)).await,
    };

    let bytes = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(mut value) => {
            if inject_tenant_ids(&mut value, &ctx) {
                match serde_json::to_vec(&value) {
                    Ok(rewritten) => {
                        debug!(societe_id = %ctx.societe_id, "Injected tenant ids into request body");
                        Bytes::from(rewritten)
                    }
                    Err(_) => bytes,
                }
            } else {
                bytes
            }
        }
        Err(_) => bytes,
    };

    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
