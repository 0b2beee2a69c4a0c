//! Embedder: the checked boundary around an embedding provider

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::DomainError;

pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(15);

/// Maps texts to vectors, one per input, in input order
///
/// Every failure of the underlying provider (transport error, timeout,
/// malformed answer) surfaces as `EmbeddingUnavailable`. Vectors of
/// differing length within one call surface as `EmbeddingDimensionMismatch`.
#[derive(Debug, Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    dimensions: Option<usize>,
    timeout: Duration,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            dimensions: None,
            timeout: DEFAULT_EMBEDDING_TIMEOUT,
        }
    }

    /// Request (and require) vectors of this length
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Vector length this embedder is expected to produce, when known
    pub fn expected_dimension(&self) -> Option<usize> {
        self.dimensions
            .or_else(|| self.provider.dimensions(&self.model))
    }

    /// Embed a sequence of texts
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = EmbeddingRequest::batch(self.model.clone(), texts.to_vec());
        if let Some(dimensions) = self.dimensions {
            request = request.with_dimensions(dimensions);
        }

        let response = match tokio::time::timeout(self.timeout, self.provider.embed(request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(provider = self.provider.provider_name(), error = %e, "Embedding call failed");
                return Err(DomainError::embedding_unavailable(e.to_string()));
            }
            Err(_) => {
                warn!(
                    provider = self.provider.provider_name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Embedding call timed out"
                );
                return Err(DomainError::embedding_unavailable(format!(
                    "timed out after {:?}",
                    self.timeout
                )));
            }
        };

        let mut indices: Vec<usize> = response.embeddings().iter().map(|e| e.index()).collect();
        indices.sort_unstable();
        if indices.len() != texts.len() || indices.iter().enumerate().any(|(i, idx)| i != *idx) {
            return Err(DomainError::embedding_unavailable(format!(
                "expected {} vectors, provider returned {}",
                texts.len(),
                indices.len()
            )));
        }

        let vectors = response.into_ordered_vectors();
        let dimension = vectors.first().map(Vec::len).unwrap_or(0);

        if dimension == 0 {
            return Err(DomainError::embedding_unavailable(
                "provider returned empty vectors",
            ));
        }

        if let Some(other) = vectors.iter().map(Vec::len).find(|len| *len != dimension) {
            return Err(DomainError::embedding_dimension_mismatch(format!(
                "vectors of length {} and {} in one response",
                dimension, other
            )));
        }

        if let Some(expected) = self.dimensions {
            if expected != dimension {
                return Err(DomainError::configuration(format!(
                    "embedding model '{}' returned {} dimensions, configured {}",
                    self.model, dimension, expected
                )));
            }
        }

        debug!(
            texts = texts.len(),
            dimension = dimension,
            "Embedded texts"
        );

        Ok(vectors)
    }

    /// Embed a single text
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| DomainError::embedding_unavailable("provider returned no vector"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::{
        Embedding, EmbeddingResponse, EmbeddingUsage, MockEmbeddingProvider,
    };
    use async_trait::async_trait;

    /// Provider returning a fixed response regardless of input
    #[derive(Debug)]
    struct FixedProvider(Vec<Vec<f32>>);

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
            let data = self
                .0
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, v)| Embedding::new(i, v))
                .collect();
            Ok(EmbeddingResponse::new(
                request.model().to_string(),
                data,
                EmbeddingUsage::default(),
            ))
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }

        fn default_model(&self) -> &'static str {
            "fixed"
        }

        fn dimensions(&self, _model: &str) -> Option<usize> {
            None
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_embed_empty_input_makes_no_call() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 16));
        let embedder = Embedder::new(provider.clone(), "mock-embedding");

        let vectors = embedder.embed(&[]).await.unwrap();

        assert!(vectors.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_embed_preserves_order() {
        let provider = Arc::new(
            MockEmbeddingProvider::new("mock", 4)
                .with_vector("first", vec![1.0, 0.0, 0.0, 0.0])
                .with_vector("second", vec![0.0, 1.0, 0.0, 0.0]),
        );
        let embedder = Embedder::new(provider, "mock-embedding");

        let vectors = embedder.embed(&texts(&["second", "first"])).await.unwrap();

        assert_eq!(vectors[0], vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(vectors[1], vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_provider_failure_is_unavailable() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 4).with_error("503"));
        let embedder = Embedder::new(provider, "mock-embedding");

        let err = embedder.embed_one("hello").await.unwrap_err();
        assert!(matches!(err, DomainError::EmbeddingUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let provider = Arc::new(
            MockEmbeddingProvider::new("mock", 4).with_delay(Duration::from_millis(200)),
        );
        let embedder =
            Embedder::new(provider, "mock-embedding").with_timeout(Duration::from_millis(10));

        let err = embedder.embed_one("hello").await.unwrap_err();
        assert!(matches!(err, DomainError::EmbeddingUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_varying_dimensions_within_call() {
        let provider = Arc::new(FixedProvider(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]));
        let embedder = Embedder::new(provider, "fixed");

        let err = embedder.embed(&texts(&["a", "b"])).await.unwrap_err();
        assert!(matches!(err, DomainError::EmbeddingDimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_missing_vectors_is_unavailable() {
        let provider = Arc::new(FixedProvider(vec![vec![1.0, 0.0]]));
        let embedder = Embedder::new(provider, "fixed");

        let err = embedder.embed(&texts(&["a", "b"])).await.unwrap_err();
        assert!(matches!(err, DomainError::EmbeddingUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_configured_dimensions_are_enforced() {
        let provider = Arc::new(FixedProvider(vec![vec![1.0, 0.0]]));
        let embedder = Embedder::new(provider, "fixed").with_dimensions(3);

        assert_eq!(embedder.expected_dimension(), Some(3));
        let err = embedder.embed_one("a").await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
