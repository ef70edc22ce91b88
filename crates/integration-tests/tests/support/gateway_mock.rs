use std::collections::VecDeque;

use support_core::llm::{
    CompletionFuture, CompletionGateway, CompletionGatewayError, CompletionRequest,
    CompletionResponse,
};
use tokio::sync::Mutex;

pub const DEFAULT_REPLY: &str = "Happy to help! 😊";

/// Records every request and answers from a queue, falling back to [`DEFAULT_REPLY`].
#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<VecDeque<Result<String, CompletionGatewayError>>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl MockGateway {
    pub fn with_replies(replies: Vec<Result<String, CompletionGatewayError>>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().await.clone()
    }
}

impl CompletionGateway for MockGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async move {
            let model = request.model.clone();
            self.seen.lock().await.push(request);

            let reply = self
                .replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(DEFAULT_REPLY.to_string()));

            reply.map(|text| CompletionResponse {
                model,
                provider_request_id: Some("mock-request".to_string()),
                text,
                usage: None,
            })
        })
    }
}
