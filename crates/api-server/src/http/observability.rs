use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Clone, Debug)]
pub(super) struct RequestContext {
    pub(super) request_id: String,
}

/// Response extension set by the chat handler with the branch that answered.
#[derive(Clone, Copy, Debug)]
pub(super) struct ChatRoute(pub(super) &'static str);

pub(super) async fn request_observability_middleware(mut req: Request, next: Next) -> Response {
    let request_id = resolve_request_id(&req);
    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or(path);
    let started_at = Instant::now();

    let mut response = next.run(req).await;
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            header_value,
        );
    }

    let status = response.status().as_u16();
    let latency_ms = started_at.elapsed().as_millis() as u64;
    let chat_route = chat_route_label(&response);
    if status >= 500 {
        warn!(
            request_id = %request_id,
            method = %method,
            endpoint = %endpoint,
            chat_route,
            status,
            latency_ms,
            "support request failed"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            endpoint = %endpoint,
            chat_route,
            status,
            latency_ms,
            "support request served"
        );
    }

    response
}

fn chat_route_label(response: &Response) -> &'static str {
    response
        .extensions()
        .get::<ChatRoute>()
        .map(|route| route.0)
        .unwrap_or("none")
}

fn resolve_request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(normalize_request_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn normalize_request_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_REQUEST_ID_LEN {
        return None;
    }

    let valid = trimmed
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.'));
    valid.then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn chat_route_label_reads_handler_extension() {
        let mut response = Response::new(Body::empty());
        assert_eq!(chat_route_label(&response), "none");

        response.extensions_mut().insert(ChatRoute("sizing"));
        assert_eq!(chat_route_label(&response), "sizing");
    }

    #[test]
    fn normalizes_valid_request_ids() {
        assert_eq!(
            normalize_request_id(" req-123._abc "),
            Some("req-123._abc".to_string())
        );
    }

    #[test]
    fn rejects_invalid_request_ids() {
        assert!(normalize_request_id("").is_none());
        assert!(normalize_request_id("abc$123").is_none());
        assert!(normalize_request_id(&"x".repeat(129)).is_none());
    }
}
