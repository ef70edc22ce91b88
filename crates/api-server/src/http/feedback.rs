use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use support_core::chat::feedback::{feedback_record, rated_conversation};
use support_core::models::{FeedbackRequest, RateResponseRequest, SuccessResponse};
use tracing::{error, info};

use super::AppState;
use super::errors::internal_error_response;
use super::observability::RequestContext;

pub(super) async fn rate_response(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(req): Json<RateResponseRequest>,
) -> Response {
    let helpful = req.helpful;
    match state
        .logs
        .log_conversation(rated_conversation(req, Utc::now()))
        .await
    {
        Ok(()) => {
            info!(request_id = %context.request_id, helpful, "response rating recorded");
            success_response()
        }
        Err(err) => {
            error!(request_id = %context.request_id, error = %err, "failed to record rating");
            internal_error_response(state.environment, &err)
        }
    }
}

pub(super) async fn submit_feedback(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(req): Json<FeedbackRequest>,
) -> Response {
    let record = feedback_record(req, Utc::now());
    info!(
        request_id = %context.request_id,
        helpful = record.helpful,
        topics = ?record.topics,
        answer_length = record.answer_length,
        has_emoji = record.has_emoji,
        "feedback received"
    );

    match state.logs.record_feedback(record).await {
        Ok(()) => success_response(),
        Err(err) => {
            error!(request_id = %context.request_id, error = %err, "failed to record feedback");
            internal_error_response(state.environment, &err)
        }
    }
}

fn success_response() -> Response {
    (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
}
