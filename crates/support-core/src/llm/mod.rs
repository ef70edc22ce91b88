pub mod gateway;
pub mod openai;

pub use gateway::{
    CompletionFuture, CompletionGateway, CompletionGatewayError, CompletionRequest,
    CompletionResponse, SamplingParams, TokenUsage,
};
pub use openai::{CompletionConfigError, CompletionGatewayConfig, ModelRoute, OpenAiGateway};
