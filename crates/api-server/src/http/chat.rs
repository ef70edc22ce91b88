use axum::Json;
use axum::extract::{Extension, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use support_core::chat::Route;
use support_core::llm::CompletionRequest;
use support_core::logs::LoggedConversation;
use support_core::models::{ChatRequest, ChatResponse};
use tracing::{error, info};

use super::AppState;
use super::errors::{bad_request_response, internal_error_response};
use super::observability::{ChatRoute, RequestContext};

pub(super) async fn chat(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(req): Json<ChatRequest>,
) -> Response {
    if req.message.trim().is_empty() {
        return bad_request_response("message is required");
    }

    let route = state.desk.classify(&req.message);
    let route_key = route.key_name();
    info!(
        request_id = %context.request_id,
        route = route_key,
        message_chars = req.message.chars().count(),
        history_turns = req.conversation_history.len(),
        "chat message classified"
    );

    let mut response = reply(&state, &context, &req, route).await;
    response.extensions_mut().insert(ChatRoute(route_key));
    response
}

async fn reply(
    state: &AppState,
    context: &RequestContext,
    req: &ChatRequest,
    route: Route<'_>,
) -> Response {
    let response = match route {
        Route::Canned(answer) => answer.to_response(),
        Route::Restricted(topic) => {
            info!(
                request_id = %context.request_id,
                topic = topic.key_name(),
                "redirecting restricted topic"
            );
            ChatResponse::text(state.desk.redirect_message())
        }
        Route::Sizing(measurement) => {
            let (request, recommendation) = state.desk.sizing_request(&req.message, &measurement);
            info!(
                request_id = %context.request_id,
                height_cm = measurement.height_cm(),
                weight_kg = measurement.weight_kg(),
                recommendation = %recommendation.describe(),
                "sizing resolved from chart"
            );
            match complete(state, context, request).await {
                Ok(text) => ChatResponse::text(text),
                Err(response) => return response,
            }
        }
        Route::General => {
            let logged = state.logs.conversations().await;
            let request = state
                .desk
                .general_request(&req.message, &req.conversation_history, &logged);
            match complete(state, context, request).await {
                Ok(text) => ChatResponse::text(text),
                Err(response) => return response,
            }
        }
    };

    record_exchange(state, context, &req.message, &response.response).await;
    Json(response).into_response()
}

async fn complete(
    state: &AppState,
    context: &RequestContext,
    request: CompletionRequest,
) -> Result<String, Response> {
    match state.gateway.complete(request).await {
        Ok(completion) => {
            info!(
                request_id = %context.request_id,
                model = %completion.model,
                provider_request_id = completion.provider_request_id.as_deref().unwrap_or(""),
                total_tokens = completion
                    .usage
                    .as_ref()
                    .map(|usage| usage.total_tokens)
                    .unwrap_or(0),
                "completion succeeded"
            );
            Ok(completion.text)
        }
        Err(err) => {
            error!(request_id = %context.request_id, error = %err, "completion failed");
            Err(internal_error_response(state.environment, &err))
        }
    }
}

/// Persistence is best effort; a failed write never changes the chat response.
async fn record_exchange(
    state: &AppState,
    context: &RequestContext,
    question: &str,
    answer: &str,
) {
    let entry = LoggedConversation {
        timestamp: Utc::now(),
        question: question.to_string(),
        answer: answer.to_string(),
        helpful: true,
    };

    if let Err(err) = state.logs.log_conversation(entry).await {
        error!(
            request_id = %context.request_id,
            error = %err,
            "failed to log conversation"
        );
    }
}
