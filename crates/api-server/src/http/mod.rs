use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::routing::{get, post};
use axum::{Router, middleware};
use support_core::chat::SupportDesk;
use support_core::config::AppEnvironment;
use support_core::llm::CompletionGateway;
use support_core::logs::LogStore;
use tower_http::set_header::SetResponseHeaderLayer;

mod chat;
mod cors;
mod errors;
mod feedback;
mod health;
mod observability;
mod rate_limit;

pub use rate_limit::{RateLimitPolicy, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<SupportDesk>,
    pub gateway: Arc<dyn CompletionGateway>,
    pub logs: Arc<LogStore>,
    pub environment: AppEnvironment,
    pub allowed_origins: Vec<String>,
    pub rate_limiter: RateLimiter,
    pub trusted_proxy_ips: HashSet<IpAddr>,
}

pub fn build_router(app_state: AppState) -> Router {
    let cors = cors::cors_layer(&app_state.allowed_origins);
    let rate_limit_state = app_state.clone();

    Router::new()
        .route("/", get(health::root_status))
        .route("/api/chat", post(chat::chat))
        .route("/api/rate-response", post(feedback::rate_response))
        .route("/api/feedback", post(feedback::submit_feedback))
        .layer(middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit::api_rate_limit_middleware,
        ))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .with_state(app_state)
}
