//! Retriever: question in, thresholded top-k chunks out

use tracing::debug;

use crate::domain::index::VectorIndexSnapshot;
use crate::domain::retrieval::{Retrieval, RetrievalConfig};
use crate::domain::DomainError;
use crate::infrastructure::embedding::Embedder;

/// Finds the chunks most relevant to a question
#[derive(Debug, Clone)]
pub struct Retriever {
    embedder: Embedder,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(embedder: Embedder, config: RetrievalConfig) -> Self {
        Self { embedder, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve with the configured `top_k`
    pub async fn retrieve_default(
        &self,
        question: &str,
        snapshot: &VectorIndexSnapshot,
    ) -> Result<Retrieval, DomainError> {
        self.retrieve(question, snapshot, self.config.top_k).await
    }

    /// Embed the question and query the snapshot
    ///
    /// Hits below `min_similarity` are dropped before the result is capped
    /// at `k`; when none remain the outcome is `NoRelevantContext`.
    pub async fn retrieve(
        &self,
        question: &str,
        snapshot: &VectorIndexSnapshot,
        k: usize,
    ) -> Result<Retrieval, DomainError> {
        if snapshot.is_empty() || k == 0 || question.trim().is_empty() {
            return Ok(Retrieval::NoRelevantContext);
        }

        let vector = self.embedder.embed_one(question).await?;

        let mut result = snapshot.query(&vector, k)?;
        let candidates = result.len();

        result.retain_min_score(self.config.min_similarity);
        result.truncate(k);

        debug!(
            question_chars = question.chars().count(),
            snapshot_version = snapshot.version(),
            candidates = candidates,
            hits = result.len(),
            top_score = result.top_score().unwrap_or_default(),
            threshold = self.config.min_similarity,
            "Retrieved chunks"
        );

        Ok(Retrieval::from_result(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::chunking::Chunk;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::index::{IndexEntry, SimilarityMetric};

    fn snapshot(provider: &MockEmbeddingProvider, rows: &[(&str, &str)]) -> VectorIndexSnapshot {
        let entries = rows
            .iter()
            .map(|(id, text)| {
                IndexEntry::new(Chunk::new(*id, "", *text, 0, 0), provider.vector_for(text))
            })
            .collect();

        VectorIndexSnapshot::build(1, entries, SimilarityMetric::Cosine).unwrap()
    }

    fn retriever(provider: Arc<MockEmbeddingProvider>, min_similarity: f32) -> Retriever {
        Retriever::new(
            Embedder::new(provider, "mock-embedding"),
            RetrievalConfig::new(3, min_similarity, SimilarityMetric::Cosine),
        )
    }

    #[tokio::test]
    async fn test_retrieves_matching_row() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 256));
        let snapshot = snapshot(
            &provider,
            &[
                ("r1", "Employees get 14 days annual leave."),
                ("r2", "Expense claims are paid monthly."),
            ],
        );

        let retrieval = retriever(provider, 0.3)
            .retrieve_default("How many annual leave days do I get?", &snapshot)
            .await
            .unwrap();

        let result = retrieval.result().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.hits()[0].chunk.source_row_id, "r1");
    }

    #[tokio::test]
    async fn test_never_returns_hits_below_threshold() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 256));
        let snapshot = snapshot(
            &provider,
            &[
                ("r1", "leave days leave days"),
                ("r2", "leave policy for contractors and interns"),
                ("r3", "office opening hours"),
            ],
        );

        for threshold in [0.0, 0.2, 0.5, 0.9] {
            let retrieval = retriever(provider.clone(), threshold)
                .retrieve("leave days", &snapshot, 3)
                .await
                .unwrap();

            if let Some(result) = retrieval.result() {
                assert!(result.hits().iter().all(|h| h.score >= threshold));
                assert!(result.len() <= 3);
            }
        }
    }

    #[tokio::test]
    async fn test_weak_match_is_no_relevant_context() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 256));
        let snapshot = snapshot(&provider, &[("r1", "Employees get 14 days annual leave.")]);

        let retrieval = retriever(provider, 0.3)
            .retrieve("Where is the parking garage?", &snapshot, 3)
            .await
            .unwrap();

        assert_eq!(retrieval, Retrieval::NoRelevantContext);
    }

    #[tokio::test]
    async fn test_empty_snapshot_skips_embedding() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 16));
        let empty = VectorIndexSnapshot::empty(1, SimilarityMetric::Cosine);

        let retrieval = retriever(provider.clone(), 0.3)
            .retrieve("anything", &empty, 3)
            .await
            .unwrap();

        assert_eq!(retrieval, Retrieval::NoRelevantContext);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_caps_at_k() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 64));
        let snapshot = snapshot(
            &provider,
            &[
                ("r1", "leave"),
                ("r2", "leave rules"),
                ("r3", "leave request"),
                ("r4", "leave balance"),
            ],
        );

        let retrieval = retriever(provider, 0.1)
            .retrieve("leave", &snapshot, 2)
            .await
            .unwrap();

        assert_eq!(retrieval.chunk_ids().len(), 2);
        assert_eq!(retrieval.chunk_ids()[0], "r1#000000");
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 16));
        let snapshot = snapshot(&provider, &[("r1", "leave")]);
        let failing = Arc::new(MockEmbeddingProvider::new("mock", 16).with_error("down"));

        let err = retriever(failing, 0.3)
            .retrieve("leave", &snapshot, 3)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::EmbeddingUnavailable { .. }));
    }
}
