//! OpenAI-compatible `/v1/chat/completions` client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::llm::{FinishReason, TokenUsage};
use crate::domain::{DomainError, LlmProvider, LlmRequest, LlmResponse, Message};

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat provider speaking the OpenAI wire format
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    endpoint: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();

        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let body = serde_json::to_value(WireRequest {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        })
        .map_err(|e| DomainError::internal(format!("Unserializable chat request: {}", e)))?;

        let headers = [
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let json = self
            .client
            .post_json(&self.endpoint, headers.to_vec(), &body)
            .await?;

        let wire: WireResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Malformed chat response: {}", e))
        })?;

        let Some(choice) = wire.choices.into_iter().next() else {
            return Err(DomainError::provider(PROVIDER, "Chat response has no choices"));
        };

        let mut response = LlmResponse::new(
            wire.id,
            wire.model,
            Message::assistant(choice.message.content.unwrap_or_default()),
        );

        if let Some(reason) = choice.finish_reason.as_deref() {
            response = response.with_finish_reason(FinishReason::from_wire(reason));
        }

        if let Some(usage) = wire.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
            response = response.with_usage(TokenUsage::new(
                usage.prompt_tokens,
                usage.completion_tokens,
            ));
        }

        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: String,
    model: String,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;
    use serde_json::json;

    const URL: &str = "https://api.openai.com/v1/chat/completions";

    fn completion(content: &str, finish_reason: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": finish_reason
            }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 12, "total_tokens": 132 }
        })
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let client = MockHttpClient::new()
            .with_response(URL, completion("You get 14 days of annual leave. [r1]", "stop"));
        let provider = OpenAiProvider::new(client, "sk-test");

        let request = LlmRequest::builder()
            .system("Answer only from the excerpts")
            .user("Question: How many leave days?")
            .temperature(0.0)
            .max_tokens(512)
            .build();

        let response = provider.chat("gpt-4o", request).await.unwrap();

        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.content(), "You get 14 days of annual leave. [r1]");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 132);
    }

    #[tokio::test]
    async fn test_request_body_layout() {
        let client = MockHttpClient::new().with_response(URL, completion("ok", "stop"));
        let provider = OpenAiProvider::new(client, "sk-test");

        let request = LlmRequest::builder()
            .system("instruction")
            .user("prompt")
            .temperature(0.0)
            .build();
        provider.chat("gpt-4o", request).await.unwrap();

        let body = &provider.client.bodies()[0];
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "prompt");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["stream"], false);
        assert!(body.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn test_truncated_reply_is_flagged() {
        let client = MockHttpClient::new().with_response(URL, completion("You get 14", "length"));
        let provider = OpenAiProvider::new(client, "sk-test");

        let response = provider
            .chat("gpt-4o", LlmRequest::builder().user("q").build())
            .await
            .unwrap();

        assert!(response.is_truncated());
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = MockHttpClient::new().with_error(URL, "HTTP 401: invalid api key");
        let provider = OpenAiProvider::new(client, "sk-bad");

        let result = provider.chat("gpt-4o", LlmRequest::builder().user("q").build()).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_missing_choices_is_an_error() {
        let client = MockHttpClient::new()
            .with_response(URL, json!({ "id": "x", "model": "gpt-4o", "choices": [] }));
        let provider = OpenAiProvider::new(client, "sk-test");

        let err = provider
            .chat("gpt-4o", LlmRequest::builder().user("q").build())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let client = MockHttpClient::new().with_response(
            "http://localhost:8000/v1/chat/completions",
            completion("local", "stop"),
        );
        let provider = OpenAiProvider::with_base_url(client, "unused", "http://localhost:8000/");

        let response = provider
            .chat("llama3", LlmRequest::builder().user("q").build())
            .await
            .unwrap();

        assert_eq!(response.content(), "local");
    }
}
