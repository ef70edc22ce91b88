use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use super::gateway::{
    CompletionFuture, CompletionGateway, CompletionGatewayError, CompletionRequest,
    CompletionResponse, TokenUsage,
};
use crate::config::ConfigError;
use crate::config_env::{optional_trimmed_env, parse_u64_env, require_non_empty_env};

const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const DEFAULT_GENERAL_MODEL: &str = "gpt-4-turbo-preview";
const DEFAULT_SIZING_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone)]
pub struct ModelRoute {
    pub general_model: String,
    pub sizing_model: String,
}

impl Default for ModelRoute {
    fn default() -> Self {
        Self {
            general_model: DEFAULT_GENERAL_MODEL.to_string(),
            sizing_model: DEFAULT_SIZING_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionGatewayConfig {
    pub chat_completions_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub model_route: ModelRoute,
}

impl CompletionGatewayConfig {
    pub fn from_env() -> Result<Self, CompletionConfigError> {
        let api_key = require_non_empty_env("OPENAI_API_KEY")?;
        let chat_completions_url = optional_trimmed_env("OPENAI_CHAT_COMPLETIONS_URL")
            .unwrap_or_else(|| DEFAULT_CHAT_COMPLETIONS_URL.to_string());
        if !chat_completions_url.starts_with("http://")
            && !chat_completions_url.starts_with("https://")
        {
            return Err(CompletionConfigError::InvalidConfiguration(
                "OPENAI_CHAT_COMPLETIONS_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            chat_completions_url,
            api_key,
            timeout_ms: parse_u64_env("OPENAI_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            model_route: ModelRoute {
                general_model: optional_trimmed_env("OPENAI_MODEL_GENERAL")
                    .unwrap_or_else(|| DEFAULT_GENERAL_MODEL.to_string()),
                sizing_model: optional_trimmed_env("OPENAI_MODEL_SIZING")
                    .unwrap_or_else(|| DEFAULT_SIZING_MODEL.to_string()),
            },
        })
    }
}

#[derive(Debug, Error)]
pub enum CompletionConfigError {
    #[error(transparent)]
    Env(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build completion http client: {0}")]
    HttpClient(String),
}

/// Chat-completions client. Each request is attempted exactly once.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    config: CompletionGatewayConfig,
}

impl OpenAiGateway {
    pub fn new(config: CompletionGatewayConfig) -> Result<Self, CompletionConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| CompletionConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model_route(&self) -> &ModelRoute {
        &self.config.model_route
    }

    async fn send_once(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionGatewayError> {
        let mut request_body = json!({
            "model": request.model,
            "messages": request.messages,
        });
        if let (Value::Object(body), Ok(Value::Object(sampling))) =
            (&mut request_body, serde_json::to_value(request.sampling))
        {
            body.extend(sampling);
        }

        let response = self
            .client
            .post(&self.config.chat_completions_url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CompletionGatewayError::Timeout
                } else {
                    CompletionGatewayError::ProviderFailure("request_unavailable".to_string())
                }
            })?;

        let status = response.status();
        let header_request_id = header_request_id(response.headers());
        let body = response.text().await.map_err(|_| {
            CompletionGatewayError::InvalidProviderPayload("response_body_read_failed".to_string())
        })?;

        if !status.is_success() {
            let provider_code = parse_provider_error_code(&body);
            return Err(CompletionGatewayError::ProviderFailure(format!(
                "status={} code={provider_code}",
                status.as_u16()
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|_| {
            CompletionGatewayError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                CompletionGatewayError::InvalidProviderPayload("missing_choice".to_string())
            })?
            .message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                CompletionGatewayError::InvalidProviderPayload("empty_content".to_string())
            })?;

        debug!(
            model = parsed.model.as_deref().unwrap_or(request.model.as_str()),
            "completion received"
        );

        Ok(CompletionResponse {
            model: parsed.model.unwrap_or(request.model),
            provider_request_id: header_request_id.or(parsed.id),
            text,
            usage: parsed.usage.map(|usage| TokenUsage {
                prompt_tokens: clamp_u64_to_u32(usage.prompt_tokens.unwrap_or(0)),
                completion_tokens: clamp_u64_to_u32(usage.completion_tokens.unwrap_or(0)),
                total_tokens: clamp_u64_to_u32(usage.total_tokens.unwrap_or(0)),
            }),
        })
    }
}

impl CompletionGateway for OpenAiGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(self.send_once(request))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

fn header_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        code: Option<Value>,
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    let Some(details) = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
    else {
        return "unknown".to_string();
    };

    match details.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => details.kind.unwrap_or_else(|| "unknown".to_string()),
    }
}

fn clamp_u64_to_u32(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}
