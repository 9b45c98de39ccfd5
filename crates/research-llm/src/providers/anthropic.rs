//! Anthropic Claude provider implementation
//!
//! Implements [`LLMProvider`] over the Messages API.
//! See: https://docs.anthropic.com/en/api/messages

use crate::retry::classify_status;
use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, RetryPolicy, Role, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    api_base: String,
    retry: RetryPolicy,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with a 120 s request timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: ANTHROPIC_API_BASE.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a provider from `ANTHROPIC_API_KEY`, honouring an optional
    /// `ANTHROPIC_BASE_URL` override
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            LLMError::ConfigurationError("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        let provider = Self::new(api_key)?;
        match std::env::var("ANTHROPIC_BASE_URL") {
            Ok(base) if !base.trim().is_empty() => Ok(provider.with_api_base(base.trim())),
            _ => Ok(provider),
        }
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the API base URL (proxies, gateways)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    async fn send_once(&self, request: &AnthropicRequest<'_>) -> Result<AnthropicResponse> {
        let response = self
            .client
            .post(format!("{}/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await?;
            return Err(classify_status(status, error_text, request.model));
        }

        response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Anthropic API");

        let anthropic_request = AnthropicRequest {
            model: &request.model,
            messages: &request.messages,
            system: request.system.as_deref(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        };

        let anthropic_response = self
            .retry
            .execute("anthropic.messages", || self.send_once(&anthropic_request))
            .await?;

        debug!(
            stop_reason = %anthropic_response.stop_reason,
            input_tokens = anthropic_response.usage.input_tokens,
            output_tokens = anthropic_response.usage.output_tokens,
            "Received response"
        );

        Ok(CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: MessageContent::Blocks(anthropic_response.content),
            },
            stop_reason: match anthropic_response.stop_reason.as_str() {
                "max_tokens" => StopReason::MaxTokens,
                "stop_sequence" => StopReason::StopSequence,
                _ => StopReason::EndTurn,
            },
            usage: TokenUsage {
                input_tokens: anthropic_response.usage.input_tokens,
                output_tokens: anthropic_response.usage.output_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// Wire types for the Messages API

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: String,
    #[serde(default)]
    usage: UsageResponse,
}

#[derive(Debug, Default, Deserialize)]
struct UsageResponse {
    input_tokens: usize,
    output_tokens: usize,
}
