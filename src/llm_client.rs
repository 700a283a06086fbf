//! LLM client adapter.
//!
//! [`GroqClient`] speaks the OpenAI-compatible chat-completions protocol that
//! Groq exposes. Construction checks the key locally; the backend's verdict
//! on it arrives with the first [`LlmClient::complete`] call.

use crate::llm_config::{ApiKeyValidator, LlmConfig};
use crate::{CompletionError, Credentials, InitError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Single text-completion capability of the LLM backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Builds clients for a (credentials, model) pair.
pub trait LlmClientFactory: Send + Sync {
    fn create(
        &self,
        credentials: &Credentials,
        model: &str,
    ) -> Result<Arc<dyn LlmClient>, InitError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<serde_json::Value>,
}

impl ApiError {
    fn code(&self) -> Option<String> {
        self.code.as_ref().map(|code| match code {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn mentions_context_length(&self) -> bool {
        let message = self.message.to_ascii_lowercase();
        self.code().as_deref() == Some("context_length_exceeded")
            || message.contains("context length")
            || message.contains("context_length")
            || message.contains("reduce the length")
            || message.contains("request too large")
    }
}

pub struct GroqClient {
    http: reqwest::Client,
    api_key: Credentials,
    config: LlmConfig,
}

impl GroqClient {
    pub fn new(api_key: Credentials, config: LlmConfig) -> Result<Self, InitError> {
        ApiKeyValidator::validate_groq_key(api_key.expose())?;
        ApiKeyValidator::validate_model_name(&config.model)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to create LLM HTTP client");
                InitError::Client(e.to_string())
            })?;

        debug!(model = %config.model, api_base = %config.api_base, "LLM client initialized");
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    fn classify_failure(status: StatusCode, body: &str) -> CompletionError {
        let api_error = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error);
        let detail = match &api_error {
            Some(e) => match &e.kind {
                Some(kind) => format!("{} ({kind}, HTTP {status})", e.message),
                None => format!("{} (HTTP {status})", e.message),
            },
            None if body.trim().is_empty() => format!("HTTP {status}"),
            None => format!("HTTP {status}: {}", crate::utils::truncate_str(body.trim(), 200)),
        };

        if api_error
            .as_ref()
            .is_some_and(ApiError::mentions_context_length)
            || status == StatusCode::PAYLOAD_TOO_LARGE
        {
            return CompletionError::ContextLength(detail);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::Auth(detail),
            StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimit(detail),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                CompletionError::Network(detail)
            }
            _ => CompletionError::ModelError(detail),
        }
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(level = "debug", skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()), err)]
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(self.config.chat_completions_url())
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "LLM request failed");
                CompletionError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_failure(status, &body));
        }

        let body: ChatResponse = response.json().await.map_err(CompletionError::from)?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::ModelError("Response contained no text".to_string())
            })?;

        debug!(response_len = content.len(), "Received completion");
        Ok(content)
    }
}

/// Creates [`GroqClient`]s sharing one [`LlmConfig`].
#[derive(Debug, Clone, Default)]
pub struct GroqClientFactory {
    config: LlmConfig,
}

impl GroqClientFactory {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }
}

impl LlmClientFactory for GroqClientFactory {
    fn create(
        &self,
        credentials: &Credentials,
        model: &str,
    ) -> Result<Arc<dyn LlmClient>, InitError> {
        let config = self.config.clone().with_model(model);
        Ok(Arc::new(GroqClient::new(credentials.clone(), config)?))
    }
}
