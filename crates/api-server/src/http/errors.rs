use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use support_core::config::AppEnvironment;
use support_core::models::ErrorResponse;

pub(super) fn bad_request_response(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
        }),
    )
        .into_response()
}

/// Generic 500; the underlying cause is only echoed outside production.
pub(super) fn internal_error_response(
    environment: AppEnvironment,
    cause: &dyn std::fmt::Display,
) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "An error occurred".to_string(),
            details: environment
                .exposes_error_details()
                .then(|| cause.to_string()),
        }),
    )
        .into_response()
}

pub(super) fn too_many_requests_response(retry_after_seconds: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse {
            error: "Too many requests; retry later".to_string(),
            details: None,
        }),
    )
        .into_response();

    if let Ok(retry_after_value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, retry_after_value);
    }

    response
}
