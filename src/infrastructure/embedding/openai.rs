//! OpenAI-compatible `/v1/embeddings` client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::embedding::{
    Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage,
};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Native vector lengths of the hosted embedding models
const MODEL_DIMENSIONS: &[(&str, usize)] = &[
    ("text-embedding-3-small", 1536),
    ("text-embedding-3-large", 3072),
    ("text-embedding-ada-002", 1536),
];

/// Embedding provider speaking the OpenAI wire format
///
/// Works against any compatible server (Azure deployments behind a proxy,
/// local inference servers) through `with_base_url`.
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    endpoint: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
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
            endpoint: format!("{}/v1/embeddings", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        // The domain request serializes to the wire body as is
        let body = serde_json::to_value(&request)
            .map_err(|e| DomainError::internal(format!("Unserializable embedding request: {}", e)))?;

        let headers = [
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let json = self
            .client
            .post_json(&self.endpoint, headers.to_vec(), &body)
            .await?;

        let wire: WireResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Malformed embedding response: {}", e))
        })?;

        debug!(
            model = %wire.model,
            vectors = wire.data.len(),
            total_tokens = wire.usage.total_tokens,
            "Embedding response received"
        );

        Ok(EmbeddingResponse::new(
            wire.model,
            wire.data
                .into_iter()
                .map(|item| Embedding::new(item.index, item.embedding))
                .collect(),
            EmbeddingUsage::new(wire.usage.prompt_tokens, wire.usage.total_tokens),
        ))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn default_model(&self) -> &'static str {
        "text-embedding-3-small"
    }

    fn dimensions(&self, model: &str) -> Option<usize> {
        MODEL_DIMENSIONS
            .iter()
            .find_map(|&(name, dims)| (name == model).then_some(dims))
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    model: String,
    data: Vec<WireEmbedding>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
struct WireEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;
    use serde_json::json;

    const URL: &str = "https://api.openai.com/v1/embeddings";

    fn vectors_response(count: usize, dims: usize) -> serde_json::Value {
        let data: Vec<_> = (0..count)
            .map(|i| json!({ "object": "embedding", "index": i, "embedding": vec![0.5_f32; dims] }))
            .collect();

        json!({
            "object": "list",
            "model": "text-embedding-3-small",
            "data": data,
            "usage": { "prompt_tokens": 7, "total_tokens": 7 }
        })
    }

    #[tokio::test]
    async fn test_batch_request_and_response() {
        let client = MockHttpClient::new().with_response(URL, vectors_response(2, 8));
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test");

        let response = provider
            .embed(
                EmbeddingRequest::batch(
                    "text-embedding-3-small",
                    vec!["Annual leave".into(), "Remote work".into()],
                )
                .with_dimensions(8),
            )
            .await
            .unwrap();

        assert_eq!(response.embeddings().len(), 2);
        assert_eq!(response.embeddings()[1].dimensions(), 8);
        assert_eq!(response.usage().prompt_tokens(), 7);

        let body = &provider.client.bodies()[0];
        assert_eq!(body["model"], "text-embedding-3-small");
        assert_eq!(body["input"][1], "Remote work");
        assert_eq!(body["dimensions"], 8);
    }

    #[tokio::test]
    async fn test_single_input_without_dimensions() {
        let client = MockHttpClient::new().with_response(URL, vectors_response(1, 4));
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test");

        provider
            .embed(EmbeddingRequest::single("text-embedding-3-small", "Parking"))
            .await
            .unwrap();

        let body = &provider.client.bodies()[0];
        assert_eq!(body["input"], "Parking");
        assert!(body.get("dimensions").is_none());
    }

    #[tokio::test]
    async fn test_out_of_order_data_is_reordered() {
        let response = json!({
            "model": "text-embedding-3-small",
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let client = MockHttpClient::new().with_response(URL, response);
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test");

        let vectors = provider
            .embed(EmbeddingRequest::batch("m", vec!["a".into(), "b".into()]))
            .await
            .unwrap()
            .into_ordered_vectors();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_transport_error_is_provider_error() {
        let client = MockHttpClient::new().with_error(URL, "HTTP 429: rate limited");
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test");

        let result = provider.embed(EmbeddingRequest::single("m", "x")).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_malformed_body_is_provider_error() {
        let client = MockHttpClient::new().with_response(URL, json!({ "data": "nope" }));
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test");

        let err = provider
            .embed(EmbeddingRequest::single("m", "x"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Malformed embedding response"));
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let client = MockHttpClient::new()
            .with_response("http://localhost:11434/v1/embeddings", vectors_response(1, 3));
        let provider =
            OpenAiEmbeddingProvider::with_base_url(client, "unused", "http://localhost:11434/");

        assert!(provider.embed(EmbeddingRequest::single("m", "x")).await.is_ok());
    }

    #[test]
    fn test_known_model_dimensions() {
        let provider = OpenAiEmbeddingProvider::new(MockHttpClient::new(), "sk-test");

        assert_eq!(provider.dimensions("text-embedding-3-large"), Some(3072));
        assert_eq!(provider.dimensions("nomic-embed-text"), None);
    }
}
